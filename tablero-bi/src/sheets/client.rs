//! Google Sheets v4 client
//!
//! Fetches whole tabs through the `values.get` endpoint with formatted
//! cell rendering, authenticated via [`TokenManager`]. No retries and no
//! backoff: a failed fetch fails the whole refresh and the next refresh
//! starts from scratch.

use super::auth::TokenManager;
use super::{SheetError, SheetGrid, SheetSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// `values.get` response body; `values` is absent for fully empty ranges
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Sheets API client bound to one spreadsheet
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    auth: TokenManager,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(spreadsheet_id: &str, credentials_path: &Path) -> Result<Self, SheetError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SheetError::Network(format!("cannot build HTTP client: {}", e)))?;
        let auth = TokenManager::from_file(http.clone(), credentials_path)?;
        Ok(Self {
            http,
            auth,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    /// Build the values.get URL with the tab name percent-encoded as a
    /// path segment (tab names routinely contain spaces)
    fn values_url(&self, tab: &str) -> Result<reqwest::Url, SheetError> {
        let mut url = reqwest::Url::parse(SHEETS_BASE_URL)
            .map_err(|e| SheetError::Network(format!("bad base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetError::Network("bad base url".to_string()))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(tab);
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");
        Ok(url)
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn fetch_grid(&self, tab: &str) -> Result<SheetGrid, SheetError> {
        let bearer = self.auth.bearer().await?;
        let url = self.values_url(tab)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| SheetError::Network(format!("fetching tab '{}': {}", tab, e)))?;

        let status = response.status();
        match status.as_u16() {
            200 => {}
            400 | 404 => return Err(SheetError::TabNotFound(tab.to_string())),
            401 | 403 => {
                return Err(SheetError::Auth(format!(
                    "sheets API returned {} for tab '{}'",
                    status.as_u16(),
                    tab
                )))
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                return Err(SheetError::Api(code, body));
            }
        }

        let values: ValuesResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Api(200, format!("malformed values response: {}", e)))?;

        let rows = values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        Ok(SheetGrid {
            tab: tab.to_string(),
            rows,
        })
    }
}

/// Formatted rendering returns strings for populated cells, but the API
/// may still emit bare numbers/bools; render those without JSON quoting
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
