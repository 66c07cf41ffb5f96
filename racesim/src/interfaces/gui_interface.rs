use crate::core::vehicle::VehicleId;
use flume::Sender;
use log::debug;

/// Maximum frequency (Hz) at which a view is expected to redraw the vehicle positions.
pub const MAX_GUI_UPDATE_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Controls that are enabled or disabled as a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    RaceStart,
    Vehicle(VehicleId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    Resting,
    Waving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoke {
    Exhaust,
    Wreck,
}

/// PresentationRenderer is everything the engine needs from a screen.
pub trait PresentationRenderer {
    /// `offset_percent` is the vehicle position as a share of the track, 0 at the start line.
    fn on_position_update(&mut self, id: VehicleId, offset_percent: f64);
    /// An empty text clears the phrase bubble.
    fn on_phrase(&mut self, id: VehicleId, text: &str, duration_ms: u64);
    fn on_breakdown_visual(&mut self, id: VehicleId);
    fn on_flag_state(&mut self, id: VehicleId, state: FlagState);
    fn on_smoke(&mut self, id: VehicleId, kind: Smoke, active: bool);
    fn on_clock_tick(&mut self, elapsed_secs: f64);
    fn on_controls_enabled(&mut self, controls: Controls, enabled: bool);
    fn on_message(&mut self, text: &str, severity: Severity);
    /// Large centered message, used for race announcements.
    fn on_banner(&mut self, text: &str);
}

/// RenderUpdate carries one renderer call to a view running elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderUpdate {
    Position { id: VehicleId, offset: f64 },
    Phrase { id: VehicleId, text: String, duration_ms: u64 },
    BreakdownVisual { id: VehicleId },
    Flag { id: VehicleId, state: FlagState },
    Smoke { id: VehicleId, kind: Smoke, active: bool },
    ClockTick { elapsed: f64 },
    ControlsEnabled { controls: Controls, enabled: bool },
    Message { text: String, severity: Severity },
    Banner { text: String },
}

/// ChannelRenderer forwards renderer calls through a flume channel, e.g. to a view thread.
#[derive(Debug, Clone)]
pub struct ChannelRenderer {
    tx: Sender<RenderUpdate>,
}

impl ChannelRenderer {
    pub fn new(tx: Sender<RenderUpdate>) -> ChannelRenderer {
        ChannelRenderer { tx }
    }

    fn send(&self, update: RenderUpdate) {
        if self.tx.send(update).is_err() {
            debug!("View disconnected, dropping render update");
        }
    }
}

impl PresentationRenderer for ChannelRenderer {
    fn on_position_update(&mut self, id: VehicleId, offset_percent: f64) {
        self.send(RenderUpdate::Position {
            id,
            offset: offset_percent,
        })
    }

    fn on_phrase(&mut self, id: VehicleId, text: &str, duration_ms: u64) {
        self.send(RenderUpdate::Phrase {
            id,
            text: text.to_owned(),
            duration_ms,
        })
    }

    fn on_breakdown_visual(&mut self, id: VehicleId) {
        self.send(RenderUpdate::BreakdownVisual { id })
    }

    fn on_flag_state(&mut self, id: VehicleId, state: FlagState) {
        self.send(RenderUpdate::Flag { id, state })
    }

    fn on_smoke(&mut self, id: VehicleId, kind: Smoke, active: bool) {
        self.send(RenderUpdate::Smoke { id, kind, active })
    }

    fn on_clock_tick(&mut self, elapsed_secs: f64) {
        self.send(RenderUpdate::ClockTick {
            elapsed: elapsed_secs,
        })
    }

    fn on_controls_enabled(&mut self, controls: Controls, enabled: bool) {
        self.send(RenderUpdate::ControlsEnabled { controls, enabled })
    }

    fn on_message(&mut self, text: &str, severity: Severity) {
        self.send(RenderUpdate::Message {
            text: text.to_owned(),
            severity,
        })
    }

    fn on_banner(&mut self, text: &str) {
        self.send(RenderUpdate::Banner {
            text: text.to_owned(),
        })
    }
}
