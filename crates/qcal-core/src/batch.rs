//! Batch submission: every line of a bulk submission is parsed and sent
//! independently, and one bad line never aborts the rest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alias::AliasMap;
use crate::parse;

/// Sentinel shown when the creator's response carries no summary.
const NO_SUMMARY: &str = "NO SUMMARY";
/// Sentinel shown when the creator's response carries no event link.
const NO_LINK: &str = "NO URL";

/// Response from a natural-language event-creation call.
///
/// The upstream API does not guarantee either field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickAddResponse {
    pub summary: Option<String>,
    pub html_link: Option<String>,
}

/// External natural-language event-creation capability.
///
/// Each call has a real external effect; there is no dry-run mode and no
/// rollback of events created earlier in a batch.
pub trait EventCreator {
    type Error: fmt::Display;

    fn create(
        &self,
        calendar_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<QuickAddResponse, Self::Error>> + Send;
}

/// One successfully created event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub summary: String,
    pub link: String,
    pub calendar_id: String,
}

/// One input line that failed parsing or submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineError {
    /// The trimmed input line that failed.
    pub line: String,
    /// Human-readable diagnostic for the user.
    pub message: String,
}

/// Outcome of one bulk submission, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub created: Vec<CreatedEvent>,
    pub errors: Vec<LineError>,
}

impl BatchResult {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.errors.is_empty()
    }
}

/// Submits every non-empty line of `raw_text` to `creator`, sequentially
/// and in input order.
///
/// Unknown aliases and creator failures are recorded as [`LineError`]s and
/// never propagate; a line with an unknown alias is not submitted at all.
pub async fn submit_batch<C: EventCreator>(
    raw_text: &str,
    aliases: &AliasMap,
    creator: &C,
) -> BatchResult {
    let mut result = BatchResult::default();

    for line in raw_text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let parsed = match parse::parse_line(line, aliases) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(line, %err, "line skipped");
                result.errors.push(LineError {
                    line: line.to_string(),
                    message: err.to_string(),
                });
                continue;
            }
        };

        match creator.create(&parsed.calendar_id, &parsed.text).await {
            Ok(response) => {
                tracing::debug!(calendar = %parsed.calendar_id, text = %parsed.text, "event created");
                result.created.push(CreatedEvent {
                    summary: response.summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
                    link: response.html_link.unwrap_or_else(|| NO_LINK.to_string()),
                    calendar_id: parsed.calendar_id,
                });
            }
            Err(err) => {
                tracing::warn!(line, %err, "event creation failed");
                result.errors.push(LineError {
                    line: line.to_string(),
                    message: format!("Failed to create event: {err}"),
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    /// Creator fake that records calls and fails on configured texts.
    #[derive(Default)]
    struct FakeCreator {
        calls: Mutex<Vec<(String, String)>>,
        fail_on: Option<&'static str>,
        blank_response: bool,
    }

    impl FakeCreator {
        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl EventCreator for FakeCreator {
        type Error = String;

        async fn create(
            &self,
            calendar_id: &str,
            text: &str,
        ) -> Result<QuickAddResponse, Self::Error> {
            self.calls
                .lock()
                .unwrap()
                .push((calendar_id.to_string(), text.to_string()));

            if self.fail_on == Some(text) {
                return Err("the API said no".to_string());
            }
            if self.blank_response {
                return Ok(QuickAddResponse::default());
            }
            Ok(QuickAddResponse {
                summary: Some(format!("summary: {text}")),
                html_link: Some(format!("https://calendar.example/{calendar_id}")),
            })
        }
    }

    fn aliases() -> AliasMap {
        [("workout", "cal_123")].into_iter().collect()
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let creator = FakeCreator::default();
        let result = submit_batch("  \n\n   \n", &aliases(), &creator).await;

        assert!(result.is_empty());
        assert!(creator.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_alias_skips_the_line_but_not_the_batch() {
        let creator = FakeCreator::default();
        let input = "@workout Push day\n@unknown Ping\nLunch with Sam";
        let result = submit_batch(input, &aliases(), &creator).await;

        assert_eq!(result.created.len(), 2);
        assert_eq!(result.created[0].calendar_id, "cal_123");
        assert_eq!(result.created[1].calendar_id, "primary");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, "@unknown Ping");
        assert_eq!(
            result.errors[0].message,
            "Unknown calendar alias '@unknown'. Available aliases: @workout"
        );

        // The creator is never invoked for the bad line.
        assert_eq!(
            creator.calls(),
            [
                ("cal_123".to_string(), "Push day".to_string()),
                ("primary".to_string(), "Lunch with Sam".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn creator_failure_is_recorded_and_later_lines_still_run() {
        let creator = FakeCreator {
            fail_on: Some("Doctor appointment"),
            ..FakeCreator::default()
        };
        let input = "Coffee at 9\nDoctor appointment\nDinner at 7";
        let result = submit_batch(input, &aliases(), &creator).await;

        assert_eq!(result.created.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, "Doctor appointment");
        assert_eq!(
            result.errors[0].message,
            "Failed to create event: the API said no"
        );
        assert_eq!(creator.calls().len(), 3);
    }

    #[tokio::test]
    async fn missing_response_fields_fall_back_to_sentinels() {
        let creator = FakeCreator {
            blank_response: true,
            ..FakeCreator::default()
        };
        let result = submit_batch("Lunch", &aliases(), &creator).await;

        assert_eq!(result.created[0].summary, "NO SUMMARY");
        assert_eq!(result.created[0].link, "NO URL");
    }

    #[tokio::test]
    async fn outcomes_keep_input_order() {
        let creator = FakeCreator::default();
        let input = "@workout A\nB\n@workout C";
        let result = submit_batch(input, &aliases(), &creator).await;

        let texts: Vec<_> = creator.calls().into_iter().map(|(_, text)| text).collect();
        assert_eq!(texts, ["A", "B", "C"]);
        assert_eq!(result.created[0].summary, "summary: A");
        assert_eq!(result.created[2].summary, "summary: C");
    }
}
