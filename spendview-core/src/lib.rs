//! spendview-core: Core types and formatting helpers for the spendview dashboard

pub mod money;
pub mod transaction;

pub use money::{format_currency, format_grouped, format_percent};
pub use transaction::{Month, Transaction, TxnType};
