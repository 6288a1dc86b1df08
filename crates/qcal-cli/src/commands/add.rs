//! Bulk event creation from free-form lines.

use std::io::{Read, Write};

use anyhow::{Context, Result};

use qcal_core::{AliasStore, BatchResult, submit_batch};

use crate::Config;
use crate::commands;

/// Runs the batch pipeline over `lines`, or stdin when no lines are given.
///
/// Created events go to `out`, per-line warnings to `err`, so piped
/// stdout stays clean.
pub async fn run<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    config: &Config,
    lines: &[String],
    json: bool,
) -> Result<()> {
    let text = if lines.is_empty() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        lines.join("\n")
    };

    let aliases = AliasStore::new(&config.aliases_path)
        .load()
        .context("failed to load aliases")?;

    let client = commands::client(config)?;
    // Credential problems are fatal up front; they never show up as
    // per-line warnings.
    client.authorize().await.context("authorization failed")?;

    let result = submit_batch(&text, &aliases, &client).await;
    report(out, err, &result, json)
}

fn report<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    result: &BatchResult,
    json: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)?;
        return Ok(());
    }

    if result.is_empty() {
        writeln!(out, "Nothing to submit.")?;
        return Ok(());
    }

    for event in &result.created {
        writeln!(out, "Created: {} [{}]", event.summary, event.calendar_id)?;
        writeln!(out, "  {}", event.link)?;
    }
    for error in &result.errors {
        writeln!(err, "warning: {}: {}", error.line, error.message)?;
    }

    Ok(())
}
