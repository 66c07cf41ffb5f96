use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle ids are owned by the registry. The engine only tracks their participation in a run.
pub type VehicleId = u32;

/// * `velocity` - Velocity parameter returned by the engine start request
/// * `distance` - Distance parameter returned by the engine start request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    pub velocity: f64,
    pub distance: f64,
}

/// Result of a drive request that reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    Success,
    Breakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Solo,
    Race,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Solo
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunMode::Solo => write!(f, "solo"),
            RunMode::Race => write!(f, "race"),
        }
    }
}

/// Ticket identifies one participation of a vehicle. Responses and timers carry the ticket they
/// were issued for, so that anything arriving after the vehicle was stopped or restarted can be
/// recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);
