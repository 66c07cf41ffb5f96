//! Race orchestration and animation engine.
//!
//! A [`core::session::RaceSession`] starts vehicles through a remote command service, animates
//! them toward the finish line, ranks their arrivals and pushes everything a screen needs to a
//! presentation renderer.

pub mod core;
pub mod interfaces;
pub mod post;
pub mod pre;
