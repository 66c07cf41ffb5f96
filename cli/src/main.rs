mod console;

use async_std::task;
use clap::Parser;
use console::ConsoleView;
use log::{debug, info, warn, LevelFilter};
use racesim::core::handle_race::{handle_race, handle_reset, RunCommand};
use racesim::core::session::RaceSession;
use racesim::interfaces::gui_interface::ChannelRenderer;
use racesim::interfaces::simulated_backend::SimulatedBackend;
use racesim::pre::read_engine_pars::{read_engine_pars, EnginePars};
use racesim::pre::sim_opts::SimOpts;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    env_logger::Builder::new()
        .filter_level(if sim_opts.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    // get engine parameters
    let engine_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        info!("Reading engine parameters from {:?}", parfile_path);
        read_engine_pars(parfile_path)?
    } else {
        info!("No parameter file provided, using built-in defaults");
        EnginePars::default()
    };
    engine_pars.validate()?;

    let command = match sim_opts.solo {
        Some(id) => RunCommand::Solo(id),
        None => RunCommand::Race(engine_pars.roster_ids(sim_opts.cars)),
    };
    let vehicle_ids = command.vehicle_ids();
    if vehicle_ids.is_empty() {
        anyhow::bail!("No cars to drive! Check the roster in the parameter file.");
    }

    // EXECUTION -----------------------------------------------------------------------------------
    let backend = Arc::new(SimulatedBackend::new(
        &engine_pars.backend,
        sim_opts.realtime_factor,
    ));

    // the console view runs in its own thread and is fed through a channel
    let (tx, rx) = flume::unbounded();
    let names = engine_pars.roster_names();
    let view = thread::spawn(move || ConsoleView::new(names).run(rx));

    let mut session = RaceSession::new(
        backend.clone(),
        Box::new(ChannelRenderer::new(tx)),
        &engine_pars.tuning,
        &engine_pars.breakdown,
        &engine_pars.phrases,
    );
    session.set_names(engine_pars.roster_names());

    for run in 1..=sim_opts.no_sim_runs {
        info!("Starting run {} of {} ({:?})", run, sim_opts.no_sim_runs, command);
        let t_start = Instant::now();

        let run_result = task::block_on(handle_race(
            &mut session,
            &command,
            &engine_pars.tuning,
            sim_opts.realtime_factor,
        ))?;
        info!("Execution time: {}ms", t_start.elapsed().as_millis());

        // POST-PROCESSING -------------------------------------------------------------------------
        run_result.print_standings()?;
        match run_result.write_standings_to_file(None) {
            Ok(path) => info!("Standings written to {}", path),
            Err(err) => warn!("Could not write the standings: {}", err),
        }

        let state = task::block_on(handle_reset(
            &mut session,
            &vehicle_ids,
            &engine_pars.tuning,
            sim_opts.realtime_factor,
        ));
        debug!("Session is {:?} after the reset", state);
    }

    // dropping the session closes the render channel and ends the view
    drop(session);
    if view.join().is_err() {
        warn!("Console view terminated unexpectedly");
    }

    let winners = backend.winners();
    if !winners.is_empty() {
        println!("RESULT: Winners list");
        for winner in winners.iter() {
            println!(
                "RESULT: Car {:>3}, wins {:>3}, best time {:.3}s",
                winner.id, winner.wins, winner.best_time
            );
        }
    }

    Ok(())
}
