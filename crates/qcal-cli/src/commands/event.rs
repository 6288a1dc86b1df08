//! Manual event creation with explicit fields.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, FixedOffset, Local};

use qcal_gcal::{EventInput, EventTime};

use crate::commands;
use crate::{Config, EventArgs};

pub async fn run<W: Write>(writer: &mut W, config: &Config, args: &EventArgs) -> Result<()> {
    let (start, end) = compute_times(args.start.as_deref(), args.end.as_deref())?;

    let input = EventInput {
        summary: args.summary.clone(),
        location: args.location.clone(),
        description: args.description.clone(),
        start: EventTime {
            date_time: start.to_rfc3339(),
        },
        end: EventTime {
            date_time: end.to_rfc3339(),
        },
    };

    let client = commands::client(config)?;
    client.authorize().await.context("authorization failed")?;
    let event = client
        .insert_event(&args.calendar, &input)
        .await
        .context("failed to create event")?;

    writeln!(
        writer,
        "Event created: {}",
        event.html_link.as_deref().unwrap_or("NO URL")
    )?;
    Ok(())
}

/// Start defaults to 10 minutes from now; end defaults to one hour after
/// start.
fn compute_times(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let start = match start {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --start '{raw}'"))?,
        None => (Local::now() + Duration::minutes(10)).fixed_offset(),
    };

    let end = match end {
        Some(raw) => {
            DateTime::parse_from_rfc3339(raw).with_context(|| format!("invalid --end '{raw}'"))?
        }
        None => start + Duration::hours(1),
    };

    Ok((start, end))
}
