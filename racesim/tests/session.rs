use approx::assert_abs_diff_eq;
use async_std::future;
use async_std::task;
use async_trait::async_trait;
use flume::Receiver;
use racesim::core::animator::TuningPars;
use racesim::core::handle_race::{handle_race, RunCommand};
use racesim::core::placement::{Placement, Standing};
use racesim::core::session::{BreakdownPars, Phrases, RaceSession, SessionError, SessionState};
use racesim::core::vehicle::{DriveOutcome, MotionParams, RunMode, VehicleId};
use racesim::interfaces::gui_interface::{ChannelRenderer, RenderUpdate, Severity, Smoke};
use racesim::interfaces::remote_interface::{RemoteCommandService, RequestFailure};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DISTANCE: f64 = 500_000.0;

#[derive(Default)]
struct ScriptedService {
    starts: HashMap<VehicleId, Result<MotionParams, RequestFailure>>,
    drives: HashMap<VehicleId, (Result<DriveOutcome, RequestFailure>, u64)>,
    stop_failures: HashMap<VehicleId, RequestFailure>,
    win_failure: Option<RequestFailure>,
    wins: Mutex<Vec<(VehicleId, f64)>>,
    stops: Mutex<Vec<VehicleId>>,
}

impl ScriptedService {
    fn car(mut self, id: VehicleId, velocity: f64, drive: DriveOutcome) -> Self {
        self.starts.insert(
            id,
            Ok(MotionParams {
                velocity,
                distance: DISTANCE,
            }),
        );
        self.drives.insert(id, (Ok(drive), 0));
        self
    }

    fn late_drive(mut self, id: VehicleId, drive: DriveOutcome, delay_ms: u64) -> Self {
        self.drives.insert(id, (Ok(drive), delay_ms));
        self
    }

    fn failing_start(mut self, id: VehicleId, failure: RequestFailure) -> Self {
        self.starts.insert(id, Err(failure));
        self
    }

    fn failing_drive(mut self, id: VehicleId, failure: RequestFailure) -> Self {
        self.drives.insert(id, (Err(failure), 0));
        self
    }

    fn failing_stop(mut self, id: VehicleId, failure: RequestFailure) -> Self {
        self.stop_failures.insert(id, failure);
        self
    }

    fn failing_win_record(mut self, failure: RequestFailure) -> Self {
        self.win_failure = Some(failure);
        self
    }

    fn wins(&self) -> Vec<(VehicleId, f64)> {
        self.wins.lock().unwrap().clone()
    }
}

fn server_error() -> RequestFailure {
    RequestFailure::Status {
        code: 500,
        reason: "Internal Server Error".to_owned(),
    }
}

#[async_trait]
impl RemoteCommandService for ScriptedService {
    async fn request_engine_start(&self, id: VehicleId) -> Result<MotionParams, RequestFailure> {
        self.starts.get(&id).cloned().unwrap_or_else(|| {
            Err(RequestFailure::Status {
                code: 404,
                reason: "Not Found".to_owned(),
            })
        })
    }

    async fn request_engine_drive(&self, id: VehicleId) -> Result<DriveOutcome, RequestFailure> {
        let (outcome, delay_ms) = self
            .drives
            .get(&id)
            .cloned()
            .unwrap_or((Ok(DriveOutcome::Success), 0));
        if delay_ms > 0 {
            task::sleep(Duration::from_millis(delay_ms)).await;
        }
        outcome
    }

    async fn request_engine_stop(&self, id: VehicleId) -> Result<MotionParams, RequestFailure> {
        self.stops.lock().unwrap().push(id);
        if let Some(failure) = self.stop_failures.get(&id) {
            return Err(failure.clone());
        }
        Ok(MotionParams {
            velocity: 0.0,
            distance: DISTANCE,
        })
    }

    async fn record_win(&self, id: VehicleId, elapsed_secs: f64) -> Result<(), RequestFailure> {
        if let Some(failure) = &self.win_failure {
            return Err(failure.clone());
        }
        self.wins.lock().unwrap().push((id, elapsed_secs));
        Ok(())
    }
}

struct Harness {
    session: RaceSession,
    service: Arc<ScriptedService>,
    updates: Receiver<RenderUpdate>,
}

fn harness(service: ScriptedService) -> Harness {
    let service = Arc::new(service);
    let (tx, rx) = flume::unbounded();
    let breakdown_pars = BreakdownPars {
        smoke_delay_ms: 0,
        phrase_delay_ms: 0,
        ..Default::default()
    };
    let session = RaceSession::new(
        service.clone(),
        Box::new(ChannelRenderer::new(tx)),
        &TuningPars::default(),
        &breakdown_pars,
        &Phrases::default(),
    );
    Harness {
        session,
        service,
        updates: rx,
    }
}

impl Harness {
    /// pump applies the next `n` session events at host time `now`.
    fn pump(&mut self, n: usize, now: f64) {
        for _ in 0..n {
            let event = task::block_on(future::timeout(
                Duration::from_secs(5),
                self.session.next_event(),
            ))
            .expect("timed out waiting for a session event")
            .expect("session event channel closed");
            self.session.handle_event(event, now);
        }
    }

    fn pump_all(&mut self, now: f64) {
        while self.session.in_flight() > 0 {
            self.pump(1, now);
        }
    }

    fn drain(&self) -> Vec<RenderUpdate> {
        self.updates.try_iter().collect()
    }

    fn assert_clock_follows_active_ids(&self) {
        assert_eq!(
            self.session.clock().is_running(),
            !self.session.active_ids().is_empty()
        );
    }
}

fn positions_of(updates: &[RenderUpdate], id: VehicleId) -> Vec<f64> {
    updates
        .iter()
        .filter_map(|update| match update {
            RenderUpdate::Position { id: car, offset } if *car == id => Some(*offset),
            _ => None,
        })
        .collect()
}

fn phrases_of(updates: &[RenderUpdate], id: VehicleId) -> Vec<String> {
    updates
        .iter()
        .filter_map(|update| match update {
            RenderUpdate::Phrase { id: car, text, .. } if *car == id => Some(text.to_owned()),
            _ => None,
        })
        .collect()
}

fn messages(updates: &[RenderUpdate]) -> Vec<(String, Severity)> {
    updates
        .iter()
        .filter_map(|update| match update {
            RenderUpdate::Message { text, severity } => Some((text.to_owned(), *severity)),
            _ => None,
        })
        .collect()
}

#[test]
fn race_ranks_follow_completion_order() {
    let service = ScriptedService::default()
        .car(1, 3.0, DriveOutcome::Success)
        .car(2, 2.0, DriveOutcome::Success)
        .car(3, 4.0, DriveOutcome::Success);
    let mut h = harness(service);

    h.session.start_race(&[1, 2, 3]).unwrap();
    assert_eq!(h.session.state(), SessionState::Armed);
    assert_eq!(h.session.mode(), RunMode::Race);

    // starts and drives answer right away and may interleave
    h.pump(6, 0.0);
    assert_eq!(h.session.state(), SessionState::Running);
    assert_eq!(h.session.active_ids().len(), 3);
    h.assert_clock_follows_active_ids();

    h.session.on_frame(0.0);
    h.session.on_frame(400.0);
    assert_eq!(h.session.standing_of(2), Standing::Placed(Placement::First));
    assert!(!h.session.active_ids().contains(&2));
    h.assert_clock_follows_active_ids();

    h.session.on_frame(600.0);
    h.session.on_frame(800.0);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::Second));
    assert_eq!(h.session.standing_of(3), Standing::Placed(Placement::Third));
    assert_eq!(h.session.state(), SessionState::Resolved);
    assert!(h.session.placement().is_run_resolved(h.session.active_ids()));
    h.assert_clock_follows_active_ids();
    assert_abs_diff_eq!(h.session.clock().elapsed(), 0.8, epsilon = 1e-9);

    h.pump_all(800.0);
    assert!(h.session.is_settled());
    let wins = h.service.wins();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].0, 2);
    assert_abs_diff_eq!(wins[0].1, 0.4, epsilon = 1e-9);

    let updates = h.drain();
    assert!(phrases_of(&updates, 2).contains(&"I WON !!!".to_owned()));
    assert!(phrases_of(&updates, 1).contains(&"I am SECOND.".to_owned()));
    assert!(phrases_of(&updates, 3).contains(&"I am THIRD.".to_owned()));
    assert!(updates.contains(&RenderUpdate::Banner {
        text: "Ghost rider (2) WON in 0.400 sec.".to_owned()
    }));
    assert!(messages(&updates)
        .iter()
        .any(|(text, severity)| text.contains("added to winners list")
            && *severity == Severity::Info));

    let result = h.session.run_result();
    let order: Vec<VehicleId> = result.arrivals.iter().map(|a| a.vehicle_id).collect();
    assert_eq!(order, vec![2, 1, 3]);
    assert_eq!(result.winner(), Some(2));
}

#[test]
fn fourth_arrival_is_a_participant() {
    let service = ScriptedService::default()
        .car(1, 1.0, DriveOutcome::Success)
        .car(2, 2.0, DriveOutcome::Success)
        .car(3, 3.0, DriveOutcome::Success)
        .car(4, 4.0, DriveOutcome::Success);
    let mut h = harness(service);

    h.session.start_race(&[1, 2, 3, 4]).unwrap();
    h.pump(8, 0.0);
    for &t in &[0.0, 200.0, 400.0, 600.0, 800.0] {
        h.session.on_frame(t);
    }

    assert_eq!(h.session.standing_of(4), Standing::Placed(Placement::Participant));
    let updates = h.drain();
    assert!(phrases_of(&updates, 4).contains(&"0.800 - Not bad".to_owned()));
}

#[test]
fn breakdown_resolves_the_run_without_a_rank() {
    let service = ScriptedService::default().car(5, 2.0, DriveOutcome::Breakdown);
    let mut h = harness(service);

    h.session.start_race(&[5]).unwrap();
    h.pump(1, 0.0);
    assert!(h.session.active_ids().contains(&5));
    h.session.on_frame(0.0);
    h.session.on_frame(100.0);

    h.pump(1, 120.0);
    assert!(h.session.active_ids().is_empty());
    assert!(h.session.resolved_ids().contains(&5));
    assert_eq!(h.session.standing_of(5), Standing::Broken);
    assert_eq!(h.session.state(), SessionState::Resolved);
    h.assert_clock_follows_active_ids();

    h.pump_all(120.0);
    assert!(h.session.is_settled());
    assert!(h.service.wins().is_empty());
    assert!(h.session.run_result().arrivals.is_empty());
    assert_eq!(h.session.run_result().broken, vec![5]);

    let updates = h.drain();
    assert!(updates.contains(&RenderUpdate::BreakdownVisual { id: 5 }));
    assert!(updates.contains(&RenderUpdate::Smoke {
        id: 5,
        kind: Smoke::Wreck,
        active: true
    }));

    h.session.on_frame(400.0);
    h.session.on_frame(1000.0);
    assert!(positions_of(&h.drain(), 5).is_empty());
}

#[test]
fn late_breakdown_never_ranks_the_broken_car() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .car(2, 10.0, DriveOutcome::Success)
        .late_drive(2, DriveOutcome::Breakdown, 200);
    let mut h = harness(service);

    h.session.start_race(&[1, 2]).unwrap();
    h.pump(2, 0.0);
    // only the drive of car 1 answers right away
    h.pump(1, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(400.0);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));
    assert_eq!(h.session.state(), SessionState::Running);

    h.pump_all(450.0);
    assert_eq!(h.session.standing_of(2), Standing::Broken);
    assert_eq!(h.session.state(), SessionState::Resolved);
    let wins = h.service.wins();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].0, 1);

    h.session.on_frame(2000.0);
    assert!(positions_of(&h.drain(), 2).iter().all(|&p| p < 99.9));
}

#[test]
fn breakdown_after_arrival_is_ignored() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .late_drive(1, DriveOutcome::Breakdown, 200);
    let mut h = harness(service);

    h.session.start_race(&[1]).unwrap();
    h.pump(1, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(400.0);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));

    h.pump_all(500.0);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));
    assert!(!h.drain().contains(&RenderUpdate::BreakdownVisual { id: 1 }));
}

#[test]
fn solo_drive_records_no_win() {
    let service = ScriptedService::default().car(7, 2.0, DriveOutcome::Success);
    let mut h = harness(service);

    h.session.start_solo(7).unwrap();
    assert_eq!(h.session.mode(), RunMode::Solo);
    h.pump(2, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(200.0);

    let halfway = positions_of(&h.drain(), 7);
    assert_abs_diff_eq!(*halfway.last().unwrap(), 50.0, epsilon = 1e-9);

    h.session.on_frame(400.0);
    assert_eq!(h.session.standing_of(7), Standing::Placed(Placement::First));
    assert_eq!(h.session.state(), SessionState::Resolved);
    assert!(h.session.is_settled());
    assert!(h.service.wins().is_empty());
    assert!(phrases_of(&h.drain(), 7).contains(&"My result 0.400 sec".to_owned()));
    assert_eq!(h.session.run_result().winner(), None);
}

#[test]
fn stopped_car_leaves_the_race_for_good() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .car(2, 3.0, DriveOutcome::Success);
    let mut h = harness(service);

    h.session.start_race(&[1, 2]).unwrap();
    h.pump(4, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(100.0);

    h.session.stop_vehicle(1);
    h.pump(1, 150.0);
    assert!(!h.session.active_ids().contains(&1));
    assert!(h.session.active_ids().contains(&2));
    h.assert_clock_follows_active_ids();
    let updates = h.drain();
    assert_eq!(positions_of(&updates, 1).last(), Some(&0.0));
    assert!(phrases_of(&updates, 1).contains(&String::new()));

    for &t in &[200.0, 400.0, 600.0] {
        h.session.on_frame(t);
    }
    assert!(positions_of(&h.drain(), 1).is_empty());
    assert_eq!(h.session.standing_of(1), Standing::Unresolved);
    assert_eq!(h.session.standing_of(2), Standing::Placed(Placement::First));
    assert_eq!(h.session.state(), SessionState::Resolved);
    h.pump_all(600.0);

    h.session.stop_all(&[1, 2]);
    h.pump(2, 700.0);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert!(h.session.placement().is_empty());
    assert_abs_diff_eq!(h.session.clock().elapsed(), 0.0);
    assert!(!h.session.clock().is_running());
    assert!(h.drain().contains(&RenderUpdate::ClockTick { elapsed: 0.0 }));
    assert_eq!(h.service.stops.lock().unwrap().len(), 3);
}

#[test]
fn failed_start_does_not_block_the_others() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .failing_start(9, RequestFailure::Unreachable("connection refused".to_owned()));
    let mut h = harness(service);

    h.session.start_race(&[1, 9]).unwrap();
    h.pump(3, 0.0);
    assert_eq!(h.session.active_ids().iter().copied().collect::<Vec<_>>(), vec![1]);

    let msgs = messages(&h.drain());
    assert!(msgs
        .iter()
        .any(|(text, _)| text == "Check connection to server"));
    assert!(msgs
        .iter()
        .any(|(text, severity)| text.starts_with("Car 9 has error") && *severity == Severity::Error));

    h.session.on_frame(0.0);
    h.session.on_frame(400.0);
    assert_eq!(h.session.state(), SessionState::Resolved);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));
    assert_eq!(h.session.standing_of(9), Standing::Unresolved);
    h.pump_all(400.0);
    assert_eq!(h.service.wins().len(), 1);
}

#[test]
fn start_commands_are_checked() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .car(2, 2.0, DriveOutcome::Success)
        .car(3, 2.0, DriveOutcome::Success);
    let mut h = harness(service);

    assert_eq!(h.session.start_race(&[]), Err(SessionError::EmptySelection));

    h.session.start_solo(1).unwrap();
    assert_eq!(
        h.session.start_solo(1),
        Err(SessionError::AlreadyParticipating(1))
    );
    assert_eq!(h.session.start_race(&[2, 3]), Err(SessionError::RunInProgress));
    h.session.start_solo(2).unwrap();
    assert_eq!(h.session.mode(), RunMode::Solo);

    h.pump_all(0.0);
    assert_eq!(h.session.active_ids().len(), 2);
}

#[test]
fn stop_during_engine_start_drops_the_late_response() {
    let service = ScriptedService::default().car(4, 2.0, DriveOutcome::Success);
    let mut h = harness(service);

    h.session.start_solo(4).unwrap();
    h.session.stop_vehicle(4);
    h.pump_all(0.0);

    assert!(h.session.active_ids().is_empty());
    assert_eq!(h.session.state(), SessionState::Idle);
    h.drain();
    h.session.on_frame(100.0);
    h.session.on_frame(500.0);
    assert!(positions_of(&h.drain(), 4).is_empty());
}

#[test]
fn new_race_starts_from_a_clean_slate() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .car(2, 3.0, DriveOutcome::Success);
    let mut h = harness(service);

    h.session.start_race(&[1, 2]).unwrap();
    h.pump(4, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(600.0);
    h.pump_all(600.0);
    assert_eq!(h.session.state(), SessionState::Resolved);

    h.session.start_race(&[2, 1]).unwrap();
    assert!(h.session.placement().arrivals().is_empty());
    assert_abs_diff_eq!(h.session.clock().elapsed(), 0.0);
    h.pump(4, 1000.0);
    h.session.on_frame(1000.0);
    h.session.on_frame(1400.0);
    assert_eq!(h.session.state(), SessionState::Running);
    h.session.on_frame(1600.0);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));
    assert_eq!(h.session.standing_of(2), Standing::Placed(Placement::Second));
}

#[test]
fn failed_drive_request_leaves_the_race_untouched() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .failing_drive(1, server_error());
    let mut h = harness(service);

    h.session.start_race(&[1]).unwrap();
    h.pump(2, 0.0);
    assert!(h.session.active_ids().contains(&1));
    assert_eq!(h.session.standing_of(1), Standing::Unresolved);
    assert_eq!(h.session.state(), SessionState::Running);
    h.assert_clock_follows_active_ids();
    assert!(messages(&h.drain()).iter().any(|(text, severity)| text
        == "Car 1 has error 500: Internal Server Error"
        && *severity == Severity::Error));

    h.session.on_frame(0.0);
    h.session.on_frame(400.0);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));
}

#[test]
fn failed_win_record_is_reported() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .failing_win_record(RequestFailure::Timeout);
    let mut h = harness(service);

    h.session.start_race(&[1]).unwrap();
    h.pump(2, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(400.0);
    h.pump_all(400.0);

    assert!(h.session.is_settled());
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));
    assert_eq!(h.session.state(), SessionState::Resolved);
    assert!(h.service.wins().is_empty());
    let msgs = messages(&h.drain());
    assert!(msgs.iter().any(|(text, severity)| text
        == "Win can not be added to winners list: 504: Request timed out"
        && *severity == Severity::Error));
    assert!(!msgs.iter().any(|(text, _)| text.contains("added to winners list")
        && !text.starts_with("Win can not")));
}

#[test]
fn failed_stop_keeps_the_car_driving() {
    let service = ScriptedService::default()
        .car(1, 2.0, DriveOutcome::Success)
        .failing_stop(1, server_error());
    let mut h = harness(service);

    h.session.start_race(&[1]).unwrap();
    h.pump(2, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(100.0);
    h.drain();

    h.session.stop_vehicle(1);
    h.pump(1, 150.0);
    assert!(h.session.active_ids().contains(&1));
    assert_eq!(h.session.state(), SessionState::Running);
    h.assert_clock_follows_active_ids();
    let updates = h.drain();
    assert!(messages(&updates)
        .iter()
        .any(|(text, severity)| text.starts_with("Car 1 has error 500") && *severity == Severity::Error));
    assert!(!updates.contains(&RenderUpdate::Position { id: 1, offset: 0.0 }));

    h.session.on_frame(200.0);
    assert_eq!(positions_of(&h.drain(), 1).len(), 1);
    h.session.on_frame(400.0);
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::First));
}

#[test]
fn cars_finishing_in_the_same_frame_are_ranked_by_crossing_time() {
    let service = ScriptedService::default()
        .car(1, 3.0, DriveOutcome::Success)
        .car(2, 2.0, DriveOutcome::Success);
    let mut h = harness(service);

    h.session.start_race(&[1, 2]).unwrap();
    h.pump(4, 0.0);
    h.session.on_frame(0.0);
    h.session.on_frame(700.0);

    assert_eq!(h.session.standing_of(2), Standing::Placed(Placement::First));
    assert_eq!(h.session.standing_of(1), Standing::Placed(Placement::Second));
    h.pump_all(700.0);
    assert_eq!(h.service.wins()[0].0, 2);
}

#[test]
fn fast_forwarded_run_still_settles() {
    let service = ScriptedService::default()
        .car(1, 30.0, DriveOutcome::Success)
        .car(2, 25.0, DriveOutcome::Success);
    let mut h = harness(service);
    let tuning = TuningPars::default();

    let runs = vec![
        (RunCommand::Solo(1), 28.0),
        (RunCommand::Race(vec![1, 2]), 200.0),
    ];
    for (command, factor) in runs {
        let result = task::block_on(future::timeout(
            Duration::from_secs(10),
            handle_race(&mut h.session, &command, &tuning, factor),
        ))
        .expect("run did not settle")
        .unwrap();

        assert_eq!(h.session.state(), SessionState::Resolved);
        assert!(h.session.active_ids().is_empty());
        assert_eq!(result.arrivals.len(), command.vehicle_ids().len());
    }
    assert_eq!(h.service.wins().len(), 1);
    assert_eq!(h.service.wins()[0].0, 2);
}
