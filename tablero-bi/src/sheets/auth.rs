//! OAuth credential handling for the sheets API
//!
//! The credential blob is an authorized-user JSON file holding a client
//! id/secret and a long-lived refresh token. It is read once into process
//! memory and exchanged at the token endpoint for short-lived Bearer
//! tokens, cached until shortly before expiry. Credential contents are
//! never logged.

use super::SheetError;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the reported expiry to avoid using a token
/// that dies mid-request
const EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Opaque credential blob (authorized-user JSON).
/// No Debug derive: this must never end up in log output.
#[derive(Clone, Deserialize)]
struct CredentialBlob {
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    bearer: String,
    expires_at: Instant,
}

/// Exchanges the credential blob for Bearer tokens on demand
pub struct TokenManager {
    http: reqwest::Client,
    blob: CredentialBlob,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    /// Load the credential blob from disk
    pub fn from_file(http: reqwest::Client, path: &Path) -> Result<Self, SheetError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SheetError::Auth(format!("cannot read credential file: {}", e)))?;
        let blob: CredentialBlob = serde_json::from_str(&content)
            .map_err(|e| SheetError::Auth(format!("malformed credential file: {}", e)))?;
        Ok(Self {
            http,
            blob,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid Bearer token, refreshing through the token endpoint
    /// when the cached one is absent or near expiry
    pub async fn bearer(&self) -> Result<String, SheetError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.bearer.clone());
            }
        }

        tracing::debug!("Refreshing sheets API access token");
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.blob.client_id.as_str()),
                ("client_secret", self.blob.client_secret.as_str()),
                ("refresh_token", self.blob.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| SheetError::Network(format!("token endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Body intentionally discarded: error payloads from the token
            // endpoint can echo credential fields
            return Err(SheetError::Auth(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Auth(format!("malformed token response: {}", e)))?;

        let expires_at = Instant::now()
            + Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_SLACK);
        let bearer = token.access_token.clone();
        *cached = Some(CachedToken {
            bearer: token.access_token,
            expires_at,
        });

        Ok(bearer)
    }
}
