//! spendview-finance: cleaning pipeline, filters, aggregations, correlations and insights

pub mod aggregate;
pub mod clean;
pub mod correlation;
pub mod dashboard;
pub mod filter;
pub mod insights;
mod stats;

pub use clean::{clean, CleanOptions};
pub use correlation::CorrelationMatrix;
pub use dashboard::{Dashboard, DashboardOutcome, ReportOptions};
pub use filter::{available_categories, DateRange, Filters};
