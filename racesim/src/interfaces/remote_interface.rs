use crate::core::vehicle::{DriveOutcome, MotionParams, VehicleId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt;

/// RequestFailure is any failed call to the remote command service. It is reported to the user
/// and never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestFailure {
    Status { code: u16, reason: String },
    Unreachable(String),
    Timeout,
}

impl RequestFailure {
    /// is_connection_problem is true if the backend could not be reached at all.
    pub fn is_connection_problem(&self) -> bool {
        matches!(self, RequestFailure::Unreachable(_) | RequestFailure::Timeout)
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RequestFailure::Status { code, reason } => write!(f, "{}: {}", code, reason),
            RequestFailure::Unreachable(detail) => write!(f, "504: {}", detail),
            RequestFailure::Timeout => write!(f, "504: Request timed out"),
        }
    }
}

impl Error for RequestFailure {}

/// RemoteCommandService is the backend that owns the engines. Calls for different vehicles are
/// independent of each other and may complete in any order.
#[async_trait]
pub trait RemoteCommandService: Send + Sync {
    async fn request_engine_start(&self, id: VehicleId) -> Result<MotionParams, RequestFailure>;

    /// Resolves once the backend decided how the drive ends.
    async fn request_engine_drive(&self, id: VehicleId) -> Result<DriveOutcome, RequestFailure>;

    /// The returned motion parameters only confirm the stop.
    async fn request_engine_stop(&self, id: VehicleId) -> Result<MotionParams, RequestFailure>;

    async fn record_win(&self, id: VehicleId, elapsed_secs: f64) -> Result<(), RequestFailure>;
}
