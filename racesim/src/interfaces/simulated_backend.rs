use crate::core::vehicle::{DriveOutcome, MotionParams, VehicleId};
use crate::interfaces::remote_interface::{RemoteCommandService, RequestFailure};
use async_std::task;
use async_trait::async_trait;
use log::debug;
use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// * `velocity_min` - Lower bound of the velocity handed out on engine start
/// * `velocity_max` - Upper bound of the velocity handed out on engine start
/// * `distance` - Distance handed out on engine start
/// * `breakdown_chance` - Probability that a drive ends with a breakdown
/// * `latency_mean_ms` - (ms) Mean response latency
/// * `latency_std_ms` - (ms) Standard deviation of the response latency
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendPars {
    pub velocity_min: f64,
    pub velocity_max: f64,
    pub distance: f64,
    pub breakdown_chance: f64,
    pub latency_mean_ms: f64,
    pub latency_std_ms: f64,
}

impl Default for BackendPars {
    fn default() -> Self {
        BackendPars {
            velocity_min: 50.0,
            velocity_max: 200.0,
            distance: 500_000.0,
            breakdown_chance: 0.25,
            latency_mean_ms: 40.0,
            latency_std_ms: 15.0,
        }
    }
}

/// Entry of the winners table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Winner {
    pub id: VehicleId,
    pub wins: u32,
    pub best_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EngineStatus {
    Started(MotionParams),
    Driving(MotionParams),
    Stopped,
}

/// SimulatedBackend stands in for the race server. Engines hand out random velocities, a drive
/// answers after the traversal time (or earlier with a breakdown), and wins are kept in an
/// in-memory winners table.
#[derive(Debug)]
pub struct SimulatedBackend {
    pars: BackendPars,
    time_scale: f64,
    engines: Mutex<HashMap<VehicleId, EngineStatus>>,
    winners: Mutex<BTreeMap<VehicleId, Winner>>,
}

impl SimulatedBackend {
    /// `time_scale` divides every delay, e.g. 2.0 answers twice as fast.
    pub fn new(pars: &BackendPars, time_scale: f64) -> SimulatedBackend {
        SimulatedBackend {
            pars: pars.to_owned(),
            time_scale: if time_scale > 0.0 { time_scale } else { 1.0 },
            engines: Mutex::new(HashMap::new()),
            winners: Mutex::new(BTreeMap::new()),
        }
    }

    /// winners returns the winners table ordered by vehicle id.
    pub fn winners(&self) -> Vec<Winner> {
        match self.winners.lock() {
            Ok(winners) => winners.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn engines(&self) -> Result<MutexGuard<HashMap<VehicleId, EngineStatus>>, RequestFailure> {
        self.engines.lock().map_err(|_| RequestFailure::Status {
            code: 500,
            reason: "Engine table unavailable".to_owned(),
        })
    }

    fn sample_latency_ms(&self) -> f64 {
        let mut rng = rand::thread_rng();
        let latency = Normal::new(self.pars.latency_mean_ms, self.pars.latency_std_ms)
            .map(|normal| normal.sample(&mut rng))
            .unwrap_or(self.pars.latency_mean_ms);
        latency.max(0.0)
    }

    async fn wait_ms(&self, ms: f64) {
        let scaled = ms / self.time_scale;
        if scaled > 0.0 {
            task::sleep(Duration::from_secs_f64(scaled / 1000.0)).await;
        }
    }

    async fn respond(&self) {
        let latency = self.sample_latency_ms();
        self.wait_ms(latency).await;
    }

    fn roll_motion(&self) -> MotionParams {
        let mut rng = rand::thread_rng();
        let velocity = if self.pars.velocity_max > self.pars.velocity_min {
            rng.gen_range(self.pars.velocity_min..=self.pars.velocity_max)
        } else {
            self.pars.velocity_min
        };
        MotionParams {
            velocity: velocity.round(),
            distance: self.pars.distance,
        }
    }

    /// roll_drive returns the outcome of a drive and the share of the traversal after which the
    /// outcome is known.
    fn roll_drive(&self) -> (DriveOutcome, f64) {
        let mut rng = rand::thread_rng();
        let breaks_down = Bernoulli::new(self.pars.breakdown_chance.max(0.0).min(1.0))
            .map(|bernoulli| bernoulli.sample(&mut rng))
            .unwrap_or(false);
        if breaks_down {
            (DriveOutcome::Breakdown, rng.gen_range(0.1..0.9))
        } else {
            (DriveOutcome::Success, 1.0)
        }
    }
}

#[async_trait]
impl RemoteCommandService for SimulatedBackend {
    async fn request_engine_start(&self, id: VehicleId) -> Result<MotionParams, RequestFailure> {
        self.respond().await;
        let motion = self.roll_motion();
        self.engines()?.insert(id, EngineStatus::Started(motion));
        debug!("Backend: engine of car {} started with {:?}", id, motion);
        Ok(motion)
    }

    async fn request_engine_drive(&self, id: VehicleId) -> Result<DriveOutcome, RequestFailure> {
        self.respond().await;
        let motion = match self.engines()?.get(&id).copied() {
            Some(EngineStatus::Started(motion)) => motion,
            Some(EngineStatus::Driving(_)) => {
                return Err(RequestFailure::Status {
                    code: 429,
                    reason: "Drive already in progress".to_owned(),
                })
            }
            _ => {
                return Err(RequestFailure::Status {
                    code: 404,
                    reason: "Engine of this car was not started".to_owned(),
                })
            }
        };
        self.engines()?.insert(id, EngineStatus::Driving(motion));

        let (outcome, share) = self.roll_drive();
        let t_travel_ms = if motion.velocity > 0.0 {
            motion.distance / motion.velocity
        } else {
            0.0
        };
        self.wait_ms(t_travel_ms * share).await;

        let mut engines = self.engines()?;
        match engines.get(&id) {
            Some(EngineStatus::Driving(_)) => {
                engines.insert(id, EngineStatus::Stopped);
                debug!("Backend: drive of car {} ended with {:?}", id, outcome);
                Ok(outcome)
            }
            _ => Err(RequestFailure::Status {
                code: 409,
                reason: "Engine was stopped during the drive".to_owned(),
            }),
        }
    }

    async fn request_engine_stop(&self, id: VehicleId) -> Result<MotionParams, RequestFailure> {
        self.respond().await;
        self.engines()?.insert(id, EngineStatus::Stopped);
        Ok(MotionParams {
            velocity: 0.0,
            distance: self.pars.distance,
        })
    }

    async fn record_win(&self, id: VehicleId, elapsed_secs: f64) -> Result<(), RequestFailure> {
        self.respond().await;
        let mut winners = self.winners.lock().map_err(|_| RequestFailure::Status {
            code: 500,
            reason: "Winners table unavailable".to_owned(),
        })?;
        let winner = winners.entry(id).or_insert(Winner {
            id,
            wins: 0,
            best_time: elapsed_secs,
        });
        winner.wins += 1;
        if elapsed_secs < winner.best_time {
            winner.best_time = elapsed_secs;
        }
        Ok(())
    }
}
