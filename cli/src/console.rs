use flume::Receiver;
use racesim::core::vehicle::VehicleId;
use racesim::interfaces::gui_interface::{
    FlagState, RenderUpdate, Severity, Smoke, MAX_GUI_UPDATE_FREQUENCY,
};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

const BOARD_WIDTH: usize = 50;

#[derive(Debug, Default)]
struct CarView {
    offset: f64,
    broken: bool,
    waving: bool,
}

/// ConsoleView draws the render updates of a session to the terminal. Announcements are printed
/// as they come in, the position board is redrawn at most MAX_GUI_UPDATE_FREQUENCY times per
/// second.
pub struct ConsoleView {
    names: HashMap<VehicleId, String>,
    cars: BTreeMap<VehicleId, CarView>,
    clock: f64,
    prev_update: Instant,
    min_update_period: Duration,
    board_dirty: bool,
}

impl ConsoleView {
    pub fn new(names: HashMap<VehicleId, String>) -> ConsoleView {
        ConsoleView {
            names,
            cars: BTreeMap::new(),
            clock: 0.0,
            prev_update: Instant::now(),
            min_update_period: Duration::from_secs_f64(1.0 / MAX_GUI_UPDATE_FREQUENCY),
            board_dirty: false,
        }
    }

    /// run consumes updates until the sending session is dropped.
    pub fn run(mut self, rx: Receiver<RenderUpdate>) {
        while let Ok(update) = rx.recv() {
            self.apply(update);

            if self.board_dirty && self.prev_update.elapsed() >= self.min_update_period {
                self.draw_board();
            }
        }

        if self.board_dirty {
            self.draw_board();
        }
    }

    fn apply(&mut self, update: RenderUpdate) {
        match update {
            RenderUpdate::Position { id, offset } => {
                self.cars.entry(id).or_default().offset = offset;
                self.board_dirty = true;
            }
            RenderUpdate::Phrase { id, text, .. } => {
                if !text.is_empty() {
                    println!("  {}: \"{}\"", self.name_of(id), text);
                }
            }
            RenderUpdate::BreakdownVisual { id } => {
                self.cars.entry(id).or_default().broken = true;
                self.board_dirty = true;
            }
            RenderUpdate::Flag { id, state } => {
                let car = self.cars.entry(id).or_default();
                car.waving = state == FlagState::Waving;
                if !car.waving {
                    car.broken = false;
                }
                self.board_dirty = true;
            }
            RenderUpdate::Smoke { id, kind, active } => {
                if kind == Smoke::Wreck && active {
                    println!("  {} is smoking on the track", self.name_of(id));
                }
            }
            RenderUpdate::ClockTick { elapsed } => {
                self.clock = elapsed;
                self.board_dirty = true;
            }
            RenderUpdate::ControlsEnabled { .. } => {}
            RenderUpdate::Message { text, severity } => match severity {
                Severity::Info => println!("INFO: {}", text),
                Severity::Warning => println!("WARNING: {}", text),
                Severity::Error => eprintln!("ERROR: {}", text),
            },
            RenderUpdate::Banner { text } => {
                println!();
                println!("*** {} ***", text);
                println!();
            }
        }
    }

    fn draw_board(&mut self) {
        println!("--- {:>8.3}s ---", self.clock);
        for (id, car) in self.cars.iter() {
            let filled = ((car.offset / 100.0).max(0.0).min(1.0) * BOARD_WIDTH as f64) as usize;
            let marker = if car.broken {
                'X'
            } else if car.waving {
                'F'
            } else {
                '>'
            };
            println!(
                "{:>3} |{}{}{}| {}",
                id,
                "=".repeat(filled),
                marker,
                " ".repeat(BOARD_WIDTH - filled),
                self.names.get(id).map(|n| n.as_str()).unwrap_or("")
            );
        }

        self.prev_update = Instant::now();
        self.board_dirty = false;
    }

    fn name_of(&self, id: VehicleId) -> String {
        match self.names.get(&id) {
            Some(name) => format!("{} ({})", name, id),
            None => format!("Car {}", id),
        }
    }
}
