//! Google Calendar API integration for qcal.
//!
//! Provides the external collaborators the core pipeline depends on:
//! - quickAdd: natural-language event creation
//! - manual event insertion with explicit fields
//! - paginated calendar listing
//!
//! Credentials come from a stored token file (see [`auth`]); the
//! interactive OAuth consent flow is out of scope.

pub mod auth;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use qcal_core::{EventCreator, QuickAddResponse};

pub use auth::{AuthError, CredentialStore, StoredToken};

/// Calendar API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Calendar client errors.
#[derive(Debug, Error)]
pub enum GcalError {
    /// Credential acquisition or refresh failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned an error response.
    #[error("calendar API error: {message}")]
    Api { message: String },

    /// The API response could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// An event as returned by the API.
///
/// Every field is optional on the wire; callers must not rely on any of
/// them being present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for manual event insertion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

/// RFC 3339 timestamp wrapper matching the API's `{"dateTime": ...}` shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
}

/// One entry from the user's calendar list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub access_role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListPage {
    #[serde(default)]
    items: Vec<CalendarEntry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

fn parse_api_error(body: &str) -> Option<GcalError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| GcalError::Api {
            message: payload.error.message,
        })
}

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    creds: CredentialStore,
}

impl Client {
    /// Creates a client against the production API.
    pub fn new(creds: CredentialStore) -> Result<Self, GcalError> {
        Self::with_base_url(creds, DEFAULT_BASE_URL)
    }

    /// Creates a client against a specific base URL (used by tests).
    pub fn with_base_url(
        creds: CredentialStore,
        base_url: impl Into<String>,
    ) -> Result<Self, GcalError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(GcalError::ClientBuild)?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            creds,
        })
    }

    /// Acquires (and if needed refreshes) an access token, verifying the
    /// credentials before any batch work starts.
    ///
    /// Auth failures here are fatal for the whole operation, unlike the
    /// per-line errors collected during a batch.
    pub async fn authorize(&self) -> Result<(), AuthError> {
        self.creds.access_token(&self.http).await.map(drop)
    }

    /// Creates an event from natural-language text via the quickAdd
    /// endpoint.
    pub async fn quick_add(&self, calendar_id: &str, text: &str) -> Result<Event, GcalError> {
        let token = self.creds.access_token(&self.http).await?;
        let url = format!("{}/calendars/{calendar_id}/events/quickAdd", self.base_url);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[("text", text)])
            .send()
            .await?;

        decode(response).await
    }

    /// Creates an event with explicit fields.
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventInput,
    ) -> Result<Event, GcalError> {
        let token = self.creds.access_token(&self.http).await?;
        let url = format!("{}/calendars/{calendar_id}/events", self.base_url);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(event)
            .send()
            .await?;

        decode(response).await
    }

    /// Lists every calendar the user has access to, following pagination
    /// until the API stops returning a continuation token.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarEntry>, GcalError> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.creds.access_token(&self.http).await?;
            let mut request = self
                .http
                .get(format!("{}/users/me/calendarList", self.base_url))
                .bearer_auth(token);
            if let Some(page_token) = &page_token {
                request = request.query(&[("pageToken", page_token)]);
            }

            let page: CalendarListPage = decode(request.send().await?).await?;
            calendars.extend(page.items);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(count = calendars.len(), "fetched calendar list");
        Ok(calendars)
    }
}

/// Reads a response body, surfacing the API's structured error message on
/// non-success statuses.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GcalError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(parse_api_error(&body).unwrap_or_else(|| GcalError::Api {
            message: format!("status {status}: {body}"),
        }));
    }

    serde_json::from_str(&body).map_err(|err| GcalError::InvalidResponse(err.to_string()))
}

impl EventCreator for Client {
    type Error = GcalError;

    async fn create(&self, calendar_id: &str, text: &str) -> Result<QuickAddResponse, GcalError> {
        let event = self.quick_add(calendar_id, text).await?;
        Ok(QuickAddResponse {
            summary: event.summary,
            html_link: event.html_link,
        })
    }
}
