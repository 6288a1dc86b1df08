//! qcal command-line interface library.

mod cli;
pub mod commands;
mod config;

pub use cli::{AliasAction, Cli, Commands, EventArgs};
pub use config::Config;
