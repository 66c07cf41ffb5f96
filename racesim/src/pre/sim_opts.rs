use crate::core::vehicle::VehicleId;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "RACE",
    about = "Drive single cars or race the whole garage against the clock"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Drive only the car with this id instead of racing the roster
    #[clap(short, long)]
    pub solo: Option<VehicleId>,

    /// Limit the race to the first N cars of the roster
    #[clap(short, long)]
    pub cars: Option<usize>,

    /// Set number of consecutive runs, the garage is reset in between
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the engine parameter file (OPTIONAL: if not set, built-in defaults are used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set real-time factor, e.g. 2.0 runs the race twice as fast
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_race_the_whole_roster() {
        let opts = SimOpts::parse_from(vec!["race"]);
        assert!(!opts.debug);
        assert_eq!(opts.solo, None);
        assert_eq!(opts.no_sim_runs, 1);
        assert!((opts.realtime_factor - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn solo_and_parfile_are_parsed() {
        let opts = SimOpts::parse_from(vec!["race", "--solo", "4", "-p", "pars.json", "-n", "3"]);
        assert_eq!(opts.solo, Some(4));
        assert_eq!(opts.no_sim_runs, 3);
        assert_eq!(opts.parfile_path, Some(PathBuf::from("pars.json")));
    }
}
