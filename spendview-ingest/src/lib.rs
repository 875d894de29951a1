//! spendview-ingest: raw tabular sources (CSV export, Google Sheets range) and a load cache.

pub mod csv_source;
pub mod sheets;
pub mod source;
pub mod types;

pub use csv_source::{read_csv, read_csv_from};
pub use sheets::{CredentialSource, SheetSpec};
pub use source::{DataSource, LoadCache, SourceKey};
pub use types::{IngestError, RawTable};
