//! Data sources and a per-session load cache keyed by load parameters.

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::csv_source::read_csv;
use crate::sheets::{fetch_range, CredentialSource, SheetSpec};
use crate::types::RawTable;

/// Where transactions are loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Csv {
        path: PathBuf,
    },
    Sheets {
        spec: SheetSpec,
        credentials_file: Option<PathBuf>,
    },
}

/// Cache key: everything that influences what a load returns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Csv(PathBuf),
    Sheets {
        spreadsheet_id: String,
        a1_range: String,
    },
}

impl DataSource {
    pub fn key(&self) -> SourceKey {
        match self {
            DataSource::Csv { path } => SourceKey::Csv(path.clone()),
            DataSource::Sheets { spec, .. } => SourceKey::Sheets {
                spreadsheet_id: spec.spreadsheet_id.clone(),
                a1_range: spec.a1_range(),
            },
        }
    }

    /// Short human label for headers and logs
    pub fn describe(&self) -> String {
        match self {
            DataSource::Csv { path } => path.display().to_string(),
            DataSource::Sheets { spec, .. } => {
                format!("sheet {} ({})", spec.spreadsheet_id, spec.a1_range())
            }
        }
    }

    /// Read the raw table. Blocking for CSV; async for Sheets.
    pub async fn load(&self) -> Result<RawTable> {
        info!(source = %self.describe(), "loading transactions");
        match self {
            DataSource::Csv { path } => read_csv(path),
            DataSource::Sheets {
                spec,
                credentials_file,
            } => {
                let creds = CredentialSource::from_env(credentials_file.clone())?;
                fetch_range(spec, &creds).await
            }
        }
    }
}

/// Remembers loaded tables for the lifetime of a session
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<SourceKey, Arc<RawTable>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `source`, loading it on first use.
    pub async fn get_or_load(&mut self, source: &DataSource) -> Result<Arc<RawTable>> {
        let key = source.key();
        if let Some(hit) = self.entries.get(&key) {
            debug!(?key, "load cache hit");
            return Ok(Arc::clone(hit));
        }
        let table = Arc::new(source.load().await?);
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table so the next access reloads it
    pub fn invalidate(&mut self, source: &DataSource) -> bool {
        self.entries.remove(&source.key()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
