//! Stored-token credentials with non-interactive refresh.
//!
//! The token file is the `token.json` written by Google's OAuth tooling.
//! Acquiring it in the first place (the browser consent flow) happens
//! outside this program; here we only load it and refresh the access token
//! when it is about to expire.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Google's OAuth 2.0 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the recorded expiry to absorb clock skew.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Credential errors. All of these are fatal for the whole operation: no
/// batch can proceed without a valid access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token file does not exist.
    #[error("no saved credentials at {path}; complete the OAuth consent flow to create it")]
    MissingToken { path: PathBuf },

    /// The token file exists but cannot be parsed.
    #[error("invalid token file {path}: {source}")]
    InvalidToken {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the token file failed.
    #[error("token file {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The access token is expired and there is no refresh token to use.
    #[error("access token expired and no refresh token is saved; re-run the OAuth consent flow")]
    RefreshUnavailable,

    /// The token endpoint rejected the refresh request.
    #[error("token refresh rejected: {message}")]
    RefreshRejected { message: String },

    /// The refresh request could not be sent.
    #[error("token refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Serde mirror of the `token.json` layout Google's tooling writes.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// The current access token.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredToken")
            .field("token", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl StoredToken {
    /// Whether the access token expires within the skew window.
    ///
    /// A token without a recorded expiry is assumed valid; the API will
    /// reject it if that assumption is wrong.
    fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now)
    }
}

/// Successful response from a `refresh_token` grant.
#[derive(Deserialize)]
struct RefreshGrant {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

fn parse_refresh_error(body: &str) -> Option<AuthError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| AuthError::RefreshRejected {
            message: payload.error_description.unwrap_or(payload.error),
        })
}

/// File-backed credential provider.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredToken, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(AuthError::MissingToken {
                    path: self.path.clone(),
                });
            }
            Err(err) => {
                return Err(AuthError::Storage {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|err| AuthError::InvalidToken {
            path: self.path.clone(),
            source: err,
        })
    }

    fn write(&self, token: &StoredToken) -> Result<(), AuthError> {
        let raw = serde_json::to_string_pretty(token).map_err(|err| AuthError::InvalidToken {
            path: self.path.clone(),
            source: err,
        })?;

        let storage_err = |source| AuthError::Storage {
            path: self.path.clone(),
            source,
        };

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(storage_err)?;
        fs::rename(&tmp, &self.path).map_err(storage_err)
    }

    /// Returns a valid access token, refreshing and persisting it first if
    /// the saved one is expired.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, AuthError> {
        let mut token = self.read()?;

        if !token.needs_refresh(Utc::now()) {
            return Ok(token.token);
        }

        let Some(refresh_token) = token.refresh_token.clone() else {
            return Err(AuthError::RefreshUnavailable);
        };

        tracing::debug!("access token expired, refreshing");
        let response = http
            .post(&token.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", token.client_id.as_str()),
                ("client_secret", token.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(
                parse_refresh_error(&body).unwrap_or_else(|| AuthError::RefreshRejected {
                    message: format!("status {status}: {body}"),
                }),
            );
        }

        let grant: RefreshGrant =
            serde_json::from_str(&body).map_err(|err| AuthError::RefreshRejected {
                message: format!("unparseable token response: {err}"),
            })?;

        token.token = grant.access_token;
        token.expiry = Some(Utc::now() + Duration::seconds(grant.expires_in.unwrap_or(3600)));
        self.write(&token)?;

        tracing::debug!(expiry = ?token.expiry, "refreshed access token persisted");
        Ok(token.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_token(dir: &Path, token: &StoredToken) -> CredentialStore {
        let file = dir.join("token.json");
        fs::write(&file, serde_json::to_string_pretty(token).unwrap()).unwrap();
        CredentialStore::new(file)
    }

    fn stored_token(token_uri: String, expiry: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            token: "stale-token".to_string(),
            refresh_token: Some("refresh-123".to_string()),
            token_uri,
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
            expiry,
        }
    }

    #[tokio::test]
    async fn valid_token_is_returned_without_a_refresh_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let expiry = Utc::now() + Duration::hours(1);
        let store = write_token(
            temp.path(),
            &stored_token("http://unreachable.invalid/token".to_string(), Some(expiry)),
        );

        let token = store.access_token(&reqwest::Client::new()).await.unwrap();
        assert_eq!(token, "stale-token");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let temp = tempfile::tempdir().unwrap();
        let expiry = Utc::now() - Duration::hours(1);
        let store = write_token(
            temp.path(),
            &stored_token(format!("{}/token", server.uri()), Some(expiry)),
        );

        let token = store.access_token(&reqwest::Client::new()).await.unwrap();
        assert_eq!(token, "fresh-token");

        // The refreshed token is written back for the next run.
        let persisted = fs::read_to_string(store.path()).unwrap();
        assert!(persisted.contains("fresh-token"), "{persisted}");
    }

    #[tokio::test]
    async fn rejected_refresh_surfaces_the_error_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Token has been revoked."
            })))
            .mount(&server)
            .await;

        let temp = tempfile::tempdir().unwrap();
        let store = write_token(
            temp.path(),
            &stored_token(
                format!("{}/token", server.uri()),
                Some(Utc::now() - Duration::hours(1)),
            ),
        );

        let err = store
            .access_token(&reqwest::Client::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "token refresh rejected: Token has been revoked."
        );
    }

    #[tokio::test]
    async fn expired_token_without_refresh_token_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let mut token = stored_token(
            "http://unreachable.invalid/token".to_string(),
            Some(Utc::now() - Duration::hours(1)),
        );
        token.refresh_token = None;
        let store = write_token(temp.path(), &token);

        let err = store
            .access_token(&reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RefreshUnavailable), "{err}");
    }

    #[tokio::test]
    async fn missing_token_file_names_the_path() {
        let temp = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(temp.path().join("token.json"));

        let err = store
            .access_token(&reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingToken { .. }), "{err}");
    }
}
