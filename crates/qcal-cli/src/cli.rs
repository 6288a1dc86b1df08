//! Command-line argument definitions.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Bulk natural-language Google Calendar client.
///
/// Every input line becomes one calendar event; a leading `@alias` routes
/// the line to a specific calendar.
#[derive(Debug, Parser)]
#[command(name = "qcal", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create events from free-form lines (arguments, or stdin when none).
    Add {
        /// Event lines, e.g. "@workout Push day tomorrow 6pm".
        line: Vec<String>,

        /// Print the batch result as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Create one event with explicit fields.
    Event(EventArgs),

    /// List all calendars available to the authenticated user.
    Calendars,

    /// Maintain the alias mapping.
    Aliases {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Run the web interface.
    Serve {
        /// Socket address to listen on (overrides config).
        #[arg(short, long)]
        address: Option<SocketAddr>,
    },
}

/// Arguments for manual event creation.
#[derive(Debug, Args)]
pub struct EventArgs {
    /// Event title.
    #[arg(long)]
    pub summary: String,

    /// Event location.
    #[arg(long, default_value = "")]
    pub location: String,

    /// Event description.
    #[arg(long, default_value = "")]
    pub description: String,

    /// Start time, RFC 3339 (defaults to 10 minutes from now).
    #[arg(long)]
    pub start: Option<String>,

    /// End time, RFC 3339 (defaults to one hour after start).
    #[arg(long)]
    pub end: Option<String>,

    /// Destination calendar ID.
    #[arg(long, default_value = "primary")]
    pub calendar: String,
}

/// Alias maintenance actions.
#[derive(Debug, Subcommand)]
pub enum AliasAction {
    /// Show configured aliases.
    List,

    /// Add or overwrite one alias.
    Set { alias: String, calendar_id: String },

    /// Remove one alias.
    Remove { alias: String },
}
