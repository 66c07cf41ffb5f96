pub mod animator;
pub mod clock;
pub mod handle_race;
pub mod placement;
pub mod session;
pub mod vehicle;
