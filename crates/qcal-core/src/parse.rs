//! Parsing one line of event text into (target calendar, clean text).

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::alias::AliasMap;

/// Sentinel calendar ID for the user's primary calendar.
pub const PRIMARY_CALENDAR: &str = "primary";

/// A leading `@alias` tag followed by at least one character of event text.
///
/// A line that is only `@alias` (no trailing text) deliberately does not
/// match and is treated as literal event text, `@` token included.
static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)\s+(.*)$").unwrap());

/// Errors from parsing a single input line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line names an alias that is not configured.
    #[error(
        "Unknown calendar alias '@{}'. Available aliases: {}",
        .alias,
        format_available(.available)
    )]
    UnknownAlias {
        alias: String,
        /// Every currently configured alias name, in insertion order.
        available: Vec<String>,
    },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        return "none configured".to_string();
    }
    available
        .iter()
        .map(|name| format!("@{name}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One input line resolved against the alias mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    /// Destination calendar ID, `"primary"` when no alias tag is present.
    pub calendar_id: String,
    /// Event text with the alias tag stripped and whitespace trimmed.
    pub text: String,
}

/// Parses a line, resolving a leading `@alias` tag against `aliases`.
pub fn parse_line(line: &str, aliases: &AliasMap) -> Result<ParsedEvent, ParseError> {
    let line = line.trim();

    let Some(captures) = ALIAS_PATTERN.captures(line) else {
        return Ok(ParsedEvent {
            calendar_id: PRIMARY_CALENDAR.to_string(),
            text: line.to_string(),
        });
    };

    let alias = captures[1].to_lowercase();
    let text = captures[2].trim().to_string();

    match aliases.get(&alias) {
        Some(calendar_id) => Ok(ParsedEvent {
            calendar_id: calendar_id.to_string(),
            text,
        }),
        None => Err(ParseError::UnknownAlias {
            alias,
            available: aliases.names().map(String::from).collect(),
        }),
    }
}
