//! Calendar listing.

use std::io::Write;

use anyhow::{Context, Result};

use qcal_gcal::CalendarEntry;

use crate::Config;
use crate::commands;

pub async fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let client = commands::client(config)?;
    client.authorize().await.context("authorization failed")?;

    let calendars = client
        .list_calendars()
        .await
        .context("failed to list calendars")?;
    render(writer, &calendars)
}

fn render<W: Write>(writer: &mut W, calendars: &[CalendarEntry]) -> Result<()> {
    writeln!(writer, "Found {} calendar(s):", calendars.len())?;

    for calendar in calendars {
        let primary = if calendar.primary { " (PRIMARY)" } else { "" };
        writeln!(writer)?;
        writeln!(
            writer,
            "Calendar: {}{primary}",
            calendar.summary.as_deref().unwrap_or("Unnamed")
        )?;
        writeln!(writer, "ID:       {}", calendar.id)?;
        writeln!(
            writer,
            "Access:   {}",
            calendar.access_role.as_deref().unwrap_or("unknown")
        )?;
    }

    Ok(())
}
