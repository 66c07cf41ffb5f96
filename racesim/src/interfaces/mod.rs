pub mod gui_interface;
pub mod remote_interface;
pub mod simulated_backend;
