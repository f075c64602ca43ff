// Library side of the Ising command-line application

pub mod app;
pub mod config;
pub mod io;
