//! Command-line interface
//!
//! One subcommand-free invocation per run: parse the flags, validate them
//! into a pipeline config, execute the cycle, print the outcome.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
