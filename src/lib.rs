pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod state;
pub mod ui;
