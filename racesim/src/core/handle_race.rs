use crate::core::animator::TuningPars;
use crate::core::session::{RaceSession, SessionState};
use crate::core::vehicle::VehicleId;
use crate::post::run_result::RunResult;
use async_std::future;
use log::{info, warn};
use std::time::{Duration, Instant};

/// RunCommand selects how a run is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCommand {
    Solo(VehicleId),
    Race(Vec<VehicleId>),
}

impl RunCommand {
    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        match self {
            RunCommand::Solo(id) => vec![*id],
            RunCommand::Race(ids) => ids.to_owned(),
        }
    }
}

/// RealtimeLoop drives a session in real time: frames and clock ticks are produced at the frame
/// period while collaborator responses are applied as soon as they arrive.
#[derive(Debug)]
pub struct RealtimeLoop {
    t_origin: Instant,
    frame_period: Duration,
    realtime_factor: f64,
}

impl RealtimeLoop {
    /// The real frame period shrinks with the real-time factor, so every frame advances the
    /// scaled host time by `frame_period_ms`.
    pub fn new(tuning: &TuningPars, realtime_factor: f64) -> RealtimeLoop {
        let realtime_factor = if realtime_factor.is_finite() && realtime_factor > 0.0 {
            realtime_factor
        } else {
            1.0
        };

        RealtimeLoop {
            t_origin: Instant::now(),
            frame_period: Duration::from_secs_f64(
                tuning.frame_period_ms.max(1) as f64 / 1000.0 / realtime_factor,
            ),
            realtime_factor,
        }
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// now_ms returns the host timestamp in milliseconds, scaled by the real-time factor.
    pub fn now_ms(&self) -> f64 {
        self.t_origin.elapsed().as_secs_f64() * 1000.0 * self.realtime_factor
    }

    /// pump_until runs the loop until `done` holds for the session.
    pub async fn pump_until<F>(&self, session: &mut RaceSession, done: F)
    where
        F: Fn(&RaceSession) -> bool,
    {
        let mut t_next_frame = Instant::now();

        while !done(session) {
            let wait = t_next_frame.saturating_duration_since(Instant::now());
            let received = future::timeout(wait, session.next_event()).await;
            if let Ok(Some(event)) = received {
                session.handle_event(event, self.now_ms());
                continue;
            }

            let now = self.now_ms();
            session.on_frame(now);
            session.on_clock_tick(now);

            t_next_frame += self.frame_period;
            let t_cur = Instant::now();
            if t_next_frame < t_cur {
                warn!("Could not keep up with real-time!");
                t_next_frame = t_cur + self.frame_period;
            }
        }
    }
}

/// handle_race starts a run with the given command and drives it in real time until the run is
/// settled, then returns the results for post-processing.
pub async fn handle_race(
    session: &mut RaceSession,
    command: &RunCommand,
    tuning: &TuningPars,
    realtime_factor: f64,
) -> anyhow::Result<RunResult> {
    match command {
        RunCommand::Solo(id) => session.start_solo(*id)?,
        RunCommand::Race(ids) => session.start_race(ids)?,
    }

    let realtime_loop = RealtimeLoop::new(tuning, realtime_factor);
    realtime_loop
        .pump_until(session, |session| session.is_settled())
        .await;

    let result = session.run_result();
    info!(
        "Run finished after {:.3}s with {} arrivals",
        result.elapsed_s,
        result.arrivals.len()
    );
    Ok(result)
}

/// handle_reset stops all given vehicles and waits until every stop was answered.
pub async fn handle_reset(
    session: &mut RaceSession,
    ids: &[VehicleId],
    tuning: &TuningPars,
    realtime_factor: f64,
) -> SessionState {
    session.stop_all(ids);

    let realtime_loop = RealtimeLoop::new(tuning, realtime_factor);
    realtime_loop
        .pump_until(session, |session| session.in_flight() == 0)
        .await;

    session.state()
}
