//! Load → clean, once per session; filters re-run against the cached rows.

use anyhow::{Context, Result};
use spendview_core::Transaction;
use spendview_finance::{clean, CleanOptions};
use spendview_ingest::{DataSource, LoadCache};
use tracing::info;

pub struct Session {
    pub source: DataSource,
    pub clean_options: CleanOptions,
    cache: LoadCache,
}

impl Session {
    pub fn new(source: DataSource, clean_options: CleanOptions) -> Self {
        Self {
            source,
            clean_options,
            cache: LoadCache::new(),
        }
    }

    /// Cleaned transactions, loading the source on first use
    pub async fn transactions(&mut self) -> Result<Vec<Transaction>> {
        let table = self
            .cache
            .get_or_load(&self.source)
            .await
            .with_context(|| format!("loading {}", self.source.describe()))?;
        let txns = clean(&table, &self.clean_options)?;
        info!(raw = table.len(), cleaned = txns.len(), "transactions ready");
        Ok(txns)
    }

    /// Forget the cached source data and load it again
    pub async fn reload(&mut self) -> Result<Vec<Transaction>> {
        self.cache.invalidate(&self.source);
        self.transactions().await
    }
}
