//! Alias mapping maintenance.

use std::io::Write;

use anyhow::{Context, Result, bail};

use qcal_core::AliasStore;

use crate::Config;

pub fn list<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let aliases = store(config).load().context("failed to load aliases")?;

    if aliases.is_empty() {
        writeln!(writer, "No aliases configured.")?;
        return Ok(());
    }

    for (alias, calendar_id) in aliases.iter() {
        writeln!(writer, "@{alias} -> {calendar_id}")?;
    }
    Ok(())
}

pub fn set<W: Write>(writer: &mut W, config: &Config, alias: &str, calendar_id: &str) -> Result<()> {
    let store = store(config);
    let mut aliases = store.load().context("failed to load aliases")?;

    aliases.insert(alias, calendar_id);
    store.save(&aliases).context("failed to save aliases")?;

    writeln!(writer, "@{} -> {calendar_id}", alias.to_lowercase())?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, config: &Config, alias: &str) -> Result<()> {
    let store = store(config);
    let mut aliases = store.load().context("failed to load aliases")?;

    let Some(calendar_id) = aliases.remove(alias) else {
        bail!("no alias named '@{}'", alias.to_lowercase());
    };
    store.save(&aliases).context("failed to save aliases")?;

    writeln!(writer, "Removed @{} ({calendar_id})", alias.to_lowercase())?;
    Ok(())
}

fn store(config: &Config) -> AliasStore {
    AliasStore::new(&config.aliases_path)
}
