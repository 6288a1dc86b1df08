//! Web interface command.

use std::net::SocketAddr;

use anyhow::{Context, Result};

use qcal_core::AliasStore;
use qcal_web::AppState;

use crate::Config;
use crate::commands;

pub async fn run(config: &Config, address: Option<SocketAddr>) -> Result<()> {
    let client = commands::client(config)?;
    // Credential problems should surface before we start listening.
    client.authorize().await.context("authorization failed")?;

    let state = AppState::new(client, AliasStore::new(&config.aliases_path));
    let address = address.unwrap_or(config.address);
    qcal_web::serve(address, state).await.context("server error")
}
