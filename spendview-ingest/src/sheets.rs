//! Read-only Google Sheets source.
//!
//! Uses the official Sheets v4 API through a service account. Credentials come
//! from `GOOGLE_CREDENTIALS_JSON` (cloud deployments) or a key file on disk
//! (local development). The network half is behind the `gsheets` feature.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{IngestError, RawTable};

/// Environment variable holding the service-account key JSON
pub const CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS_JSON";

pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

/// Which worksheet range to read
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetSpec {
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Open-ended so the sheet can keep growing (e.g. `A10:O`)
    #[serde(default = "default_range")]
    pub range: String,
}

pub fn default_sheet_name() -> String {
    "spending-r".to_string()
}

pub fn default_range() -> String {
    "A10:O".to_string()
}

impl SheetSpec {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: default_sheet_name(),
            range: default_range(),
        }
    }

    /// A1 notation including the worksheet: `spending-r!A10:O`
    pub fn a1_range(&self) -> String {
        format!("{}!{}", self.sheet_name, self.range)
    }
}

/// Where the service-account key comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Inline JSON (from the environment)
    Json(String),
    /// Key file on disk
    File(PathBuf),
}

impl CredentialSource {
    /// Resolve credentials: inline JSON wins over a configured key file.
    pub fn resolve(
        env_json: Option<String>,
        file: Option<PathBuf>,
    ) -> Result<Self, IngestError> {
        if let Some(json) = env_json.filter(|s| !s.trim().is_empty()) {
            return Ok(CredentialSource::Json(json));
        }
        file.map(CredentialSource::File)
            .ok_or(IngestError::Credentials)
    }

    /// Resolve using the process environment
    pub fn from_env(file: Option<PathBuf>) -> Result<Self, IngestError> {
        Self::resolve(std::env::var(CREDENTIALS_ENV).ok(), file)
    }
}

/// Turn a values response (rows of cells) into a table; the first row holds headers.
pub fn table_from_values(range: &str, values: Vec<Vec<String>>) -> Result<RawTable, IngestError> {
    let mut it = values.into_iter();
    let headers = it
        .next()
        .ok_or_else(|| IngestError::EmptySheet(range.to_string()))?;
    Ok(RawTable::new(headers, it.collect()))
}

#[cfg(feature = "gsheets")]
mod client {
    use anyhow::{Context, Result};
    use google_sheets4::oauth2;
    use google_sheets4::Sheets;
    use tracing::{debug, info};

    use super::{table_from_values, CredentialSource, SheetSpec, READONLY_SCOPE};
    use crate::types::RawTable;

    async fn service_account_key(creds: &CredentialSource) -> Result<oauth2::ServiceAccountKey> {
        match creds {
            CredentialSource::Json(json) => {
                oauth2::parse_service_account_key(json).context("parsing GOOGLE_CREDENTIALS_JSON")
            }
            CredentialSource::File(path) => oauth2::read_service_account_key(path)
                .await
                .with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Fetch a range as a table (first row = headers)
    pub async fn fetch_range(spec: &SheetSpec, creds: &CredentialSource) -> Result<RawTable> {
        let key = service_account_key(creds).await?;
        let auth = oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .context("building service account authenticator")?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let hub = Sheets::new(hyper::Client::builder().build(connector), auth);

        let range = spec.a1_range();
        info!(spreadsheet = %spec.spreadsheet_id, %range, "fetching sheet range");
        let (_, value_range) = hub
            .spreadsheets()
            .values_get(&spec.spreadsheet_id, &range)
            .add_scope(READONLY_SCOPE)
            .doit()
            .await
            .with_context(|| format!("reading {} from {}", range, spec.spreadsheet_id))?;

        let values: Vec<Vec<String>> = value_range
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();
        debug!(rows = values.len(), "sheet values received");

        Ok(table_from_values(&range, values)?)
    }

    fn cell_to_string(v: serde_json::Value) -> String {
        match v {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[cfg(feature = "gsheets")]
pub use client::fetch_range;

/// Stub used when the crate is built without the `gsheets` feature
#[cfg(not(feature = "gsheets"))]
pub async fn fetch_range(_spec: &SheetSpec, _creds: &CredentialSource) -> anyhow::Result<RawTable> {
    Err(IngestError::SheetsDisabled.into())
}
