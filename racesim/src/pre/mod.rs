pub mod read_engine_pars;
pub mod sim_opts;
