//! Kalori terminal front-end - exposes modules for testing

pub mod cli;
pub mod errors;
pub mod logging;
pub mod spinner;
pub mod terminal;
