//! Web surface for qcal: a bulk submission form and an alias settings page.
//!
//! Batch results are request-scoped: the response to a submission renders
//! the outcome of that submission and nothing is kept in shared state, so
//! concurrent callers cannot observe each other's results.

mod html;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;

use qcal_core::{AliasMap, AliasStore, EventCreator, submit_batch};

/// Shared server state: the event-creation collaborator and the alias
/// store. Neither holds any per-request data.
pub struct AppState<C> {
    creator: C,
    aliases: AliasStore,
}

impl<C> AppState<C> {
    pub fn new(creator: C, aliases: AliasStore) -> Self {
        Self { creator, aliases }
    }
}

#[derive(Debug, Deserialize)]
struct SubmitForm {
    bulk_text: String,
}

#[derive(Debug, Deserialize)]
struct SettingsForm {
    aliases: String,
}

/// Builds the application router.
pub fn router<C>(state: AppState<C>) -> Router
where
    C: EventCreator + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index::<C>))
        .route("/submit", post(submit::<C>))
        .route("/settings", get(settings::<C>).post(save_settings::<C>))
        .with_state(Arc::new(state))
}

/// Binds `address` and serves until ctrl-c.
pub async fn serve<C>(address: SocketAddr, state: AppState<C>) -> io::Result<()>
where
    C: EventCreator + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install ctrl-c handler");
    }
}

fn failure(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(html::failure_page(message)),
    )
        .into_response()
}

async fn index<C>(State(state): State<Arc<AppState<C>>>) -> Response
where
    C: EventCreator + Send + Sync + 'static,
{
    match state.aliases.load() {
        Ok(aliases) => Html(html::index_page(&aliases)).into_response(),
        Err(err) => failure(&err.to_string()),
    }
}

async fn submit<C>(
    State(state): State<Arc<AppState<C>>>,
    Form(form): Form<SubmitForm>,
) -> Response
where
    C: EventCreator + Send + Sync + 'static,
{
    let aliases = match state.aliases.load() {
        Ok(aliases) => aliases,
        Err(err) => return failure(&err.to_string()),
    };

    let result = submit_batch(&form.bulk_text, &aliases, &state.creator).await;
    tracing::info!(
        created = result.created.len(),
        errors = result.errors.len(),
        "batch submitted"
    );
    Html(html::results_page(&result)).into_response()
}

async fn settings<C>(State(state): State<Arc<AppState<C>>>) -> Response
where
    C: EventCreator + Send + Sync + 'static,
{
    match state.aliases.load() {
        Ok(aliases) => Html(html::settings_page(&aliases, None)).into_response(),
        Err(err) => failure(&err.to_string()),
    }
}

async fn save_settings<C>(
    State(state): State<Arc<AppState<C>>>,
    Form(form): Form<SettingsForm>,
) -> Response
where
    C: EventCreator + Send + Sync + 'static,
{
    let aliases = match parse_alias_lines(&form.aliases) {
        Ok(aliases) => aliases,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Html(html::failure_page(&message)),
            )
                .into_response();
        }
    };

    if let Err(err) = state.aliases.save(&aliases) {
        return failure(&err.to_string());
    }

    let notice = format!("Saved {} alias(es).", aliases.len());
    Html(html::settings_page(&aliases, Some(&notice))).into_response()
}

/// Parses the settings textarea: one `alias = calendar-id` pair per line.
///
/// Any malformed line rejects the whole submission so a typo cannot
/// silently drop an alias during a wholesale replace.
fn parse_alias_lines(input: &str) -> Result<AliasMap, String> {
    let mut aliases = AliasMap::new();

    for line in input.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((alias, calendar_id)) = line.split_once('=') else {
            return Err(format!("'{line}' is not an 'alias = calendar-id' pair"));
        };
        let alias = alias.trim().trim_start_matches('@');
        let calendar_id = calendar_id.trim();
        if alias.is_empty() || calendar_id.is_empty() {
            return Err(format!("'{line}' is missing an alias or a calendar ID"));
        }
        aliases.insert(alias, calendar_id);
    }

    Ok(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;

    use qcal_core::QuickAddResponse;

    /// Creator fake: succeeds unless the line text matches `fail_on`.
    struct FakeCreator {
        fail_on: Option<&'static str>,
    }

    impl EventCreator for FakeCreator {
        type Error = String;

        async fn create(
            &self,
            calendar_id: &str,
            text: &str,
        ) -> Result<QuickAddResponse, Self::Error> {
            if self.fail_on == Some(text) {
                return Err("quota exceeded".to_string());
            }
            Ok(QuickAddResponse {
                summary: Some(text.to_string()),
                html_link: Some(format!("https://calendar.example/{calendar_id}")),
            })
        }
    }

    fn state_with_aliases(
        temp: &tempfile::TempDir,
        fail_on: Option<&'static str>,
    ) -> Arc<AppState<FakeCreator>> {
        let store = AliasStore::new(temp.path().join("aliases.json"));
        let aliases: AliasMap = [("workout", "cal_123")].into_iter().collect();
        store.save(&aliases).unwrap();
        Arc::new(AppState::new(FakeCreator { fail_on }, store))
    }

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn alias_lines_parse_normalize_and_overwrite() {
        let aliases = parse_alias_lines(
            "@Workout = cal_123\n\n  eng = cal_456  \nWORKOUT = cal_789\n",
        )
        .unwrap();

        assert_eq!(aliases.get("workout"), Some("cal_789"));
        assert_eq!(aliases.get("eng"), Some("cal_456"));
        assert_eq!(aliases.names().collect::<Vec<_>>(), ["workout", "eng"]);
    }

    #[test]
    fn malformed_alias_line_rejects_the_whole_submission() {
        let err = parse_alias_lines("workout = cal_123\njust-an-alias\n").unwrap_err();
        assert!(err.contains("just-an-alias"), "{err}");
    }

    #[tokio::test]
    async fn index_lists_aliases_from_the_store() {
        let temp = tempfile::tempdir().unwrap();
        let state = state_with_aliases(&temp, None);

        let response = index(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_of(response).await;
        assert!(body.contains("<code>@workout</code>"), "{body}");
        assert!(body.contains("bulk_text"), "{body}");
    }

    #[tokio::test]
    async fn index_with_a_corrupt_alias_file_is_a_failure_page() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("aliases.json");
        std::fs::write(&path, "{broken").unwrap();
        let state = Arc::new(AppState::new(
            FakeCreator { fail_on: None },
            AliasStore::new(path),
        ));

        let response = index(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert!(body.contains("Something went wrong"), "{body}");
    }

    #[tokio::test]
    async fn submit_renders_created_events_and_warnings_together() {
        let temp = tempfile::tempdir().unwrap();
        let state = state_with_aliases(&temp, None);

        let response = submit(
            State(state),
            Form(SubmitForm {
                bulk_text: "@workout Push day\nLunch with Sam\n@unknown Ping".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_of(response).await;
        assert!(body.contains("Push day"), "{body}");
        assert!(body.contains("Lunch with Sam"), "{body}");
        assert!(
            body.contains("Unknown calendar alias &#39;@unknown&#39;"),
            "{body}"
        );
    }

    #[tokio::test]
    async fn creator_failure_shows_as_a_warning_not_a_failure_page() {
        let temp = tempfile::tempdir().unwrap();
        let state = state_with_aliases(&temp, Some("Doctor appointment"));

        let response = submit(
            State(state),
            Form(SubmitForm {
                bulk_text: "Coffee at 9\nDoctor appointment".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_of(response).await;
        assert!(body.contains("Coffee at 9"), "{body}");
        assert!(
            body.contains("Failed to create event: quota exceeded"),
            "{body}"
        );
    }

    #[tokio::test]
    async fn corrupt_alias_file_is_a_whole_operation_failure() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("aliases.json");
        std::fs::write(&path, "{broken").unwrap();
        let state = Arc::new(AppState::new(
            FakeCreator { fail_on: None },
            AliasStore::new(path),
        ));

        let response = submit(
            State(state),
            Form(SubmitForm {
                bulk_text: "Lunch".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn save_settings_replaces_the_store_wholesale() {
        let temp = tempfile::tempdir().unwrap();
        let state = state_with_aliases(&temp, None);

        let response = save_settings(
            State(Arc::clone(&state)),
            Form(SettingsForm {
                aliases: "gym = cal_999\n".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let saved = state.aliases.load().unwrap();
        assert_eq!(saved.get("gym"), Some("cal_999"));
        // The old mapping is gone: save replaces, it does not merge.
        assert_eq!(saved.get("workout"), None);
    }

    #[tokio::test]
    async fn malformed_settings_leave_the_store_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let state = state_with_aliases(&temp, None);

        let response = save_settings(
            State(Arc::clone(&state)),
            Form(SettingsForm {
                aliases: "gym cal_999".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let saved = state.aliases.load().unwrap();
        assert_eq!(saved.get("workout"), Some("cal_123"));
    }
}
