use crate::core::animator::{TuningPars, VehicleAnimator};
use crate::core::clock::RaceClock;
use crate::core::placement::{Placement, PlacementError, PlacementTracker, Standing};
use crate::core::vehicle::{DriveOutcome, MotionParams, RunMode, Ticket, VehicleId};
use crate::interfaces::gui_interface::{Controls, FlagState, PresentationRenderer, Severity, Smoke};
use crate::interfaces::remote_interface::{RemoteCommandService, RequestFailure};
use crate::post::run_result::{ArrivalRecord, RunResult};
use async_std::task;
use flume::{Receiver, Sender};
use helpers::general::fmt_secs;
use log::{debug, error, info, warn};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const START_PHRASE_MS: u64 = 2000;
const ARRIVAL_PHRASE_MS: u64 = 2000;
const GOOD_CAR_PHRASE_MS: u64 = 3000;
const RESET_PHRASE_MS: u64 = 3000;
const FALLBACK_NAME: &str = "Ghost rider";

/// * `crash_phrase_ms` - (ms) Display duration of the crash phrase
/// * `smoke_delay_ms` - (ms) Delay between the crash and the wreck smoke
/// * `phrase_delay_ms` - (ms) Delay between the crash and the broken car phrase
/// * `broken_phrase_ms` - (ms) Display duration of the broken car phrase
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BreakdownPars {
    pub crash_phrase_ms: u64,
    pub smoke_delay_ms: u64,
    pub phrase_delay_ms: u64,
    pub broken_phrase_ms: u64,
}

impl Default for BreakdownPars {
    fn default() -> Self {
        BreakdownPars {
            crash_phrase_ms: 3000,
            smoke_delay_ms: 2000,
            phrase_delay_ms: 4000,
            broken_phrase_ms: 5000,
        }
    }
}

/// Phrase lists the vehicles pick from at random.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Phrases {
    pub start: Vec<String>,
    pub good_car: Vec<String>,
    pub broken_car: Vec<String>,
    pub reset: Vec<String>,
    pub crash: Vec<String>,
}

impl Default for Phrases {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Phrases {
            start: owned(&["Let's go!", "Vroom vroom!", "Hold my oil."]),
            good_car: owned(&["Smooth ride.", "Not a scratch!"]),
            broken_car: owned(&["Call a tow truck...", "I need a mechanic."]),
            reset: owned(&["Back to the garage.", "OK, OK, stopping."]),
            crash: owned(&["BOOM!", "Ouch!"]),
        }
    }
}

fn pick(list: &[String]) -> &str {
    list.choose(&mut rand::thread_rng())
        .map(|s| s.as_str())
        .unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Armed,
    Running,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownEffect {
    Smoke,
    Phrase,
}

/// SessionEvent is a collaborator response or timer that has to be applied to the session.
#[derive(Debug)]
pub enum SessionEvent {
    EngineStarted {
        id: VehicleId,
        ticket: Ticket,
        outcome: Result<MotionParams, RequestFailure>,
    },
    DriveFinished {
        id: VehicleId,
        ticket: Ticket,
        outcome: Result<DriveOutcome, RequestFailure>,
    },
    EngineStopped {
        id: VehicleId,
        outcome: Result<MotionParams, RequestFailure>,
    },
    WinRecorded {
        id: VehicleId,
        outcome: Result<(), RequestFailure>,
    },
    Breakdown {
        id: VehicleId,
        ticket: Ticket,
        effect: BreakdownEffect,
    },
}

/// SessionError is returned for start commands the session cannot accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    EmptySelection,
    RunInProgress,
    AlreadyParticipating(VehicleId),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::EmptySelection => write!(f, "No cars selected"),
            SessionError::RunInProgress => write!(f, "A race is already in progress"),
            SessionError::AlreadyParticipating(id) => {
                write!(f, "Car {} already takes part in this run", id)
            }
        }
    }
}

impl Error for SessionError {}

/// RaceSession coordinates a run: it starts engines, animates vehicles, ranks arrivals and keeps
/// the race clock. All run state is owned here and mutated from one place only, so responses of
/// concurrent requests arrive as [`SessionEvent`]s through a channel and are applied one by one.
pub struct RaceSession {
    service: Arc<dyn RemoteCommandService>,
    renderer: Box<dyn PresentationRenderer>,
    tuning: TuningPars,
    breakdown_pars: BreakdownPars,
    phrases: Phrases,
    names: HashMap<VehicleId, String>,

    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
    in_flight: usize,

    state: SessionState,
    mode: RunMode,
    next_ticket: u64,
    tickets: HashMap<VehicleId, Ticket>,
    starting_ids: BTreeSet<VehicleId>,
    active_ids: BTreeSet<VehicleId>,
    resolved_ids: BTreeSet<VehicleId>,
    animators: BTreeMap<VehicleId, VehicleAnimator>,
    arrival_times: HashMap<VehicleId, f64>,
    clock: RaceClock,
    placement: PlacementTracker,
}

impl RaceSession {
    pub fn new(
        service: Arc<dyn RemoteCommandService>,
        renderer: Box<dyn PresentationRenderer>,
        tuning: &TuningPars,
        breakdown_pars: &BreakdownPars,
        phrases: &Phrases,
    ) -> RaceSession {
        let (tx, rx) = flume::unbounded();

        RaceSession {
            service,
            renderer,
            tuning: tuning.to_owned(),
            breakdown_pars: breakdown_pars.to_owned(),
            phrases: phrases.to_owned(),
            names: HashMap::new(),
            tx,
            rx,
            in_flight: 0,
            state: SessionState::Idle,
            mode: RunMode::Solo,
            next_ticket: 0,
            tickets: HashMap::new(),
            starting_ids: BTreeSet::new(),
            active_ids: BTreeSet::new(),
            resolved_ids: BTreeSet::new(),
            animators: BTreeMap::new(),
            arrival_times: HashMap::new(),
            clock: RaceClock::new(tuning.clock_period_ms),
            placement: PlacementTracker::new(),
        }
    }

    /// set_names provides display names for banners and messages.
    pub fn set_names(&mut self, names: HashMap<VehicleId, String>) {
        self.names = names;
    }

    // ---------------------------------------------------------------------------------------------
    // GETTERS -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn active_ids(&self) -> &BTreeSet<VehicleId> {
        &self.active_ids
    }

    pub fn resolved_ids(&self) -> &BTreeSet<VehicleId> {
        &self.resolved_ids
    }

    pub fn clock(&self) -> &RaceClock {
        &self.clock
    }

    pub fn placement(&self) -> &PlacementTracker {
        &self.placement
    }

    pub fn standing_of(&self, id: VehicleId) -> Standing {
        self.placement.standing_of(id)
    }

    /// is_settled is true once the run is over and no request or timer is outstanding.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, SessionState::Idle | SessionState::Resolved)
            && self.in_flight == 0
            && self.starting_ids.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn run_result(&self) -> RunResult {
        RunResult {
            mode: self.mode,
            elapsed_s: self.clock.elapsed(),
            arrivals: self
                .placement
                .arrivals()
                .iter()
                .map(|&(id, placement)| ArrivalRecord {
                    vehicle_id: id,
                    placement: placement.to_string(),
                    time_s: self.arrival_times.get(&id).copied(),
                })
                .collect(),
            broken: self.placement.broken().iter().copied().collect(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // COMMANDS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// start_solo drives a single vehicle. Further solo drives join a solo run in progress.
    pub fn start_solo(&mut self, id: VehicleId) -> Result<(), SessionError> {
        self.arm(RunMode::Solo, &[id])
    }

    /// start_race starts all given vehicles at once.
    pub fn start_race(&mut self, ids: &[VehicleId]) -> Result<(), SessionError> {
        self.arm(RunMode::Race, ids)
    }

    /// stop_vehicle asks the backend to stop the engine. The vehicle is taken out of the run once
    /// the stop is confirmed.
    pub fn stop_vehicle(&mut self, id: VehicleId) {
        let phrase = pick(&self.phrases.reset).to_owned();
        self.renderer.on_phrase(id, &phrase, RESET_PHRASE_MS);

        let service = Arc::clone(&self.service);
        self.spawn_request(async move {
            let outcome = service.request_engine_stop(id).await;
            SessionEvent::EngineStopped { id, outcome }
        });
    }

    /// stop_all stops every given vehicle. Once all of them are out, the session is back to idle.
    pub fn stop_all(&mut self, ids: &[VehicleId]) {
        for &id in ids {
            self.stop_vehicle(id);
        }
    }

    fn arm(&mut self, mode: RunMode, ids: &[VehicleId]) -> Result<(), SessionError> {
        let ids: BTreeSet<VehicleId> = ids.iter().copied().collect();
        if ids.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        match self.state {
            SessionState::Idle | SessionState::Resolved => self.begin_run(mode),
            SessionState::Armed | SessionState::Running => {
                if mode != RunMode::Solo || self.mode != RunMode::Solo {
                    return Err(SessionError::RunInProgress);
                }
                if let Some(&id) = ids.iter().find(|id| self.is_participating(**id)) {
                    return Err(SessionError::AlreadyParticipating(id));
                }
            }
        }

        self.renderer.on_controls_enabled(Controls::RaceStart, false);
        if mode == RunMode::Race {
            self.renderer.on_banner("Start your ENGINES !!!");
        }

        for id in ids {
            self.enlist(id);
        }
        Ok(())
    }

    fn begin_run(&mut self, mode: RunMode) {
        self.mode = mode;
        self.tickets.clear();
        self.resolved_ids.clear();
        self.arrival_times.clear();
        self.placement.clear();
        if self.clock.reset() {
            self.renderer.on_clock_tick(0.0);
        }
        self.state = SessionState::Armed;
        info!("Run armed in {} mode", mode);
    }

    fn enlist(&mut self, id: VehicleId) {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.tickets.insert(id, ticket);
        self.starting_ids.insert(id);
        self.renderer.on_controls_enabled(Controls::Vehicle(id), false);

        let service = Arc::clone(&self.service);
        self.spawn_request(async move {
            let outcome = service.request_engine_start(id).await;
            SessionEvent::EngineStarted {
                id,
                ticket,
                outcome,
            }
        });
    }

    fn is_participating(&self, id: VehicleId) -> bool {
        self.starting_ids.contains(&id)
            || self.active_ids.contains(&id)
            || self.resolved_ids.contains(&id)
    }

    fn is_current(&self, id: VehicleId, ticket: Ticket) -> bool {
        self.tickets.get(&id) == Some(&ticket)
    }

    // ---------------------------------------------------------------------------------------------
    // EVENT PUMP ----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// next_event waits for the next collaborator response or timer.
    pub async fn next_event(&self) -> Option<SessionEvent> {
        self.rx.recv_async().await.ok()
    }

    /// handle_event applies one event. `now` is the host timestamp in milliseconds.
    pub fn handle_event(&mut self, event: SessionEvent, now: f64) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            SessionEvent::EngineStarted {
                id,
                ticket,
                outcome,
            } => self.on_engine_started(id, ticket, outcome, now),
            SessionEvent::DriveFinished {
                id,
                ticket,
                outcome,
            } => self.on_drive_finished(id, ticket, outcome, now),
            SessionEvent::EngineStopped { id, outcome } => self.on_engine_stopped(id, outcome, now),
            SessionEvent::WinRecorded { id, outcome } => self.on_win_recorded(id, outcome),
            SessionEvent::Breakdown { id, ticket, effect } => {
                self.on_breakdown_effect(id, ticket, effect)
            }
        }
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = SessionEvent> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        task::spawn(async move {
            let event = request.await;
            if tx.send(event).is_err() {
                debug!("Session dropped before the response arrived");
            }
        });
    }

    fn spawn_timer(&mut self, delay_ms: u64, event: SessionEvent) {
        self.spawn_request(async move {
            task::sleep(Duration::from_millis(delay_ms)).await;
            event
        });
    }

    // ---------------------------------------------------------------------------------------------
    // FRAMES --------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// on_frame advances every scheduled animator to `now` and handles the arrivals of this frame.
    pub fn on_frame(&mut self, now: f64) {
        let mut arrived = Vec::new();
        let mut unscheduled = Vec::new();

        for (&id, animator) in self.animators.iter_mut() {
            if let Some(frame) = animator.on_frame(now) {
                self.renderer.on_position_update(id, frame.offset);
                if frame.completed {
                    arrived.push((frame.t_crossing.unwrap_or(now), id));
                }
                if !frame.reschedule {
                    unscheduled.push(id);
                }
            }
        }

        for id in unscheduled {
            self.animators.remove(&id);
            if !arrived.iter().any(|&(_, arrived_id)| arrived_id == id)
                && self.active_ids.contains(&id)
            {
                warn!(
                    "Car {} ran out of track without crossing the finish threshold",
                    id
                );
            }
        }

        // vehicles arriving within one frame are ranked by when they crossed the threshold
        arrived.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        for (_, id) in arrived {
            self.arrive(id, now);
        }
    }

    /// on_clock_tick pushes a clock sample to the renderer once per sampling period.
    pub fn on_clock_tick(&mut self, now: f64) {
        if let Some(elapsed) = self.clock.tick(now) {
            self.renderer.on_clock_tick(elapsed);
        }
    }

    fn cancel_animation(&mut self, id: VehicleId) {
        if let Some(mut animator) = self.animators.remove(&id) {
            animator.cancel();
        }
    }

    // ---------------------------------------------------------------------------------------------
    // TRANSITIONS ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn on_engine_started(
        &mut self,
        id: VehicleId,
        ticket: Ticket,
        outcome: Result<MotionParams, RequestFailure>,
        now: f64,
    ) {
        if !self.is_current(id, ticket) {
            debug!("Dropping stale engine start response of car {}", id);
            return;
        }
        self.starting_ids.remove(&id);

        let motion = match outcome {
            Ok(motion) => motion,
            Err(err) => {
                self.report_failure(id, &err);
                self.tickets.remove(&id);
                self.renderer.on_controls_enabled(Controls::Vehicle(id), true);
                self.settle(now);
                return;
            }
        };

        self.active_ids.insert(id);
        self.placement.enroll(id);
        if self.clock.start(now) {
            debug!("Race clock started");
        }
        if self.state == SessionState::Armed {
            self.state = SessionState::Running;
            if self.mode == RunMode::Race {
                self.renderer.on_banner("GO!");
            }
        }

        self.renderer.on_smoke(id, Smoke::Exhaust, true);
        let phrase = pick(&self.phrases.start).to_owned();
        self.renderer.on_phrase(id, &phrase, START_PHRASE_MS);
        self.animators
            .insert(id, VehicleAnimator::start(&motion, &self.tuning));
        info!(
            "Car {} started (velocity {}, distance {})",
            id, motion.velocity, motion.distance
        );

        let service = Arc::clone(&self.service);
        self.spawn_request(async move {
            let outcome = service.request_engine_drive(id).await;
            SessionEvent::DriveFinished {
                id,
                ticket,
                outcome,
            }
        });
    }

    fn on_drive_finished(
        &mut self,
        id: VehicleId,
        ticket: Ticket,
        outcome: Result<DriveOutcome, RequestFailure>,
        now: f64,
    ) {
        if !self.is_current(id, ticket) {
            debug!("Dropping stale drive response of car {}", id);
            return;
        }

        match outcome {
            Ok(DriveOutcome::Success) => {
                let phrase = pick(&self.phrases.good_car).to_owned();
                self.renderer.on_phrase(id, &phrase, GOOD_CAR_PHRASE_MS);
            }
            Ok(DriveOutcome::Breakdown) => {
                if self.active_ids.contains(&id) {
                    self.break_down(id, now);
                } else {
                    debug!("Ignoring breakdown of car {}, it is no longer driving", id);
                }
            }
            Err(err) => self.report_failure(id, &err),
        }
    }

    fn break_down(&mut self, id: VehicleId, now: f64) {
        self.cancel_animation(id);
        self.active_ids.remove(&id);
        self.resolved_ids.insert(id);
        if let Err(err) = self.placement.register_breakdown(id) {
            self.precondition_violation(err);
        }
        info!("Car {} broke down", id);

        self.renderer.on_breakdown_visual(id);
        let phrase = pick(&self.phrases.crash).to_owned();
        self.renderer
            .on_phrase(id, &phrase, self.breakdown_pars.crash_phrase_ms);
        self.renderer.on_smoke(id, Smoke::Exhaust, false);

        if let Some(&ticket) = self.tickets.get(&id) {
            let smoke_delay = self.breakdown_pars.smoke_delay_ms;
            let phrase_delay = self.breakdown_pars.phrase_delay_ms;
            self.spawn_timer(
                smoke_delay,
                SessionEvent::Breakdown {
                    id,
                    ticket,
                    effect: BreakdownEffect::Smoke,
                },
            );
            self.spawn_timer(
                phrase_delay,
                SessionEvent::Breakdown {
                    id,
                    ticket,
                    effect: BreakdownEffect::Phrase,
                },
            );
        }

        self.settle(now);
    }

    fn on_breakdown_effect(&mut self, id: VehicleId, ticket: Ticket, effect: BreakdownEffect) {
        if !self.is_current(id, ticket) || self.placement.standing_of(id) != Standing::Broken {
            debug!("Dropping breakdown effect of car {}", id);
            return;
        }
        match effect {
            BreakdownEffect::Smoke => self.renderer.on_smoke(id, Smoke::Wreck, true),
            BreakdownEffect::Phrase => {
                let phrase = pick(&self.phrases.broken_car).to_owned();
                self.renderer
                    .on_phrase(id, &phrase, self.breakdown_pars.broken_phrase_ms);
            }
        }
    }

    fn arrive(&mut self, id: VehicleId, now: f64) {
        if !self.active_ids.remove(&id) {
            return;
        }
        self.resolved_ids.insert(id);

        let placement = match self.placement.register_arrival(id) {
            Ok(placement) => placement,
            Err(err) => {
                self.precondition_violation(err);
                self.settle(now);
                return;
            }
        };
        let elapsed = self.clock.sample(now);
        self.arrival_times.insert(id, elapsed);
        info!("Car {} arrived {} after {}s", id, placement, fmt_secs(elapsed));

        self.renderer.on_smoke(id, Smoke::Exhaust, false);
        self.renderer.on_flag_state(id, FlagState::Waving);
        let phrase = arrival_phrase(self.mode, placement, elapsed);
        self.renderer.on_phrase(id, &phrase, ARRIVAL_PHRASE_MS);

        if placement == Placement::First && self.mode == RunMode::Race {
            let banner = format!("{} ({}) WON in {} sec.", self.name_of(id), id, fmt_secs(elapsed));
            self.renderer.on_banner(&banner);

            let service = Arc::clone(&self.service);
            self.spawn_request(async move {
                let outcome = service.record_win(id, elapsed).await;
                SessionEvent::WinRecorded { id, outcome }
            });
        }

        self.settle(now);
    }

    fn on_win_recorded(&mut self, id: VehicleId, outcome: Result<(), RequestFailure>) {
        match outcome {
            Ok(()) => {
                let text = format!("{} ({}) added to winners list", self.name_of(id), id);
                self.renderer.on_message(&text, Severity::Info);
            }
            Err(err) => {
                warn!("Recording the win of car {} failed: {}", id, err);
                let text = format!("Win can not be added to winners list: {}", err);
                self.renderer.on_message(&text, Severity::Error);
            }
        }
    }

    fn on_engine_stopped(
        &mut self,
        id: VehicleId,
        outcome: Result<MotionParams, RequestFailure>,
        now: f64,
    ) {
        if let Err(err) = outcome {
            self.report_failure(id, &err);
            return;
        }

        self.cancel_animation(id);
        self.tickets.remove(&id);
        self.starting_ids.remove(&id);
        self.active_ids.remove(&id);
        self.resolved_ids.remove(&id);
        self.arrival_times.remove(&id);
        self.placement.forget(id);
        info!("Car {} stopped", id);

        self.renderer.on_position_update(id, 0.0);
        self.renderer.on_smoke(id, Smoke::Exhaust, false);
        self.renderer.on_smoke(id, Smoke::Wreck, false);
        self.renderer.on_phrase(id, "", 0);
        self.renderer.on_flag_state(id, FlagState::Resting);
        self.renderer.on_controls_enabled(Controls::Vehicle(id), true);

        self.settle(now);

        if self.state != SessionState::Idle
            && self.starting_ids.is_empty()
            && self.active_ids.is_empty()
            && self.resolved_ids.is_empty()
        {
            self.reset_run();
        }
    }

    /// settle stops the clock once no vehicle is active and resolves the run once no vehicle is
    /// waiting for its engine either.
    fn settle(&mut self, now: f64) {
        if !self.active_ids.is_empty() {
            return;
        }
        if self.clock.is_running() {
            let elapsed = self.clock.sample(now);
            self.clock.stop();
            self.renderer.on_clock_tick(elapsed);
        }
        if !self.starting_ids.is_empty() {
            return;
        }

        if matches!(self.state, SessionState::Armed | SessionState::Running) {
            self.state = SessionState::Resolved;
            self.renderer.on_controls_enabled(Controls::RaceStart, true);
            info!(
                "Run resolved after {}s: {} arrived, {} broke down",
                fmt_secs(self.clock.elapsed()),
                self.placement.arrivals().len(),
                self.placement.broken().len()
            );
            if !self.placement.is_run_resolved(&self.active_ids) {
                error!("Run resolved with unaccounted vehicles");
            }
        }
    }

    fn reset_run(&mut self) {
        if self.clock.reset() {
            self.renderer.on_clock_tick(0.0);
        }
        self.placement.clear();
        self.arrival_times.clear();
        self.tickets.clear();
        self.renderer.on_controls_enabled(Controls::RaceStart, true);
        self.state = SessionState::Idle;
        info!("Session reset");
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn report_failure(&mut self, id: VehicleId, err: &RequestFailure) {
        warn!("Request for car {} failed: {}", id, err);
        if err.is_connection_problem() {
            self.renderer
                .on_message("Check connection to server", Severity::Error);
        }
        let text = format!("Car {} has error {}", id, err);
        self.renderer.on_message(&text, Severity::Error);
    }

    fn precondition_violation(&self, err: PlacementError) {
        error!("{}", err);
        debug_assert!(false, "{}", err);
    }

    fn name_of(&self, id: VehicleId) -> &str {
        self.names
            .get(&id)
            .map(|name| name.as_str())
            .unwrap_or(FALLBACK_NAME)
    }
}

/// arrival_phrase is what an arriving vehicle says. Solo drives only announce the time.
pub fn arrival_phrase(mode: RunMode, placement: Placement, elapsed: f64) -> String {
    match (mode, placement) {
        (RunMode::Solo, _) => format!("My result {} sec", fmt_secs(elapsed)),
        (RunMode::Race, Placement::First) => "I WON !!!".to_owned(),
        (RunMode::Race, Placement::Second) => "I am SECOND.".to_owned(),
        (RunMode::Race, Placement::Third) => "I am THIRD.".to_owned(),
        (RunMode::Race, Placement::Participant) => format!("{} - Not bad", fmt_secs(elapsed)),
    }
}
