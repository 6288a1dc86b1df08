//! CLI subcommand implementations.

pub mod add;
pub mod aliases;
pub mod calendars;
pub mod event;
pub mod serve;

use anyhow::{Context, Result};

use qcal_gcal::{Client, CredentialStore};

use crate::Config;

/// Builds the calendar client from the configured token path.
pub(crate) fn client(config: &Config) -> Result<Client> {
    let creds = CredentialStore::new(&config.token_path);
    Client::new(creds).context("failed to build calendar client")
}
