//! One render cycle: filter the cleaned data and derive every view from it.

use serde::{Deserialize, Serialize};
use spendview_core::Transaction;
use tracing::debug;

use crate::aggregate::{
    category_ranges, category_totals, monthly_spend, monthly_table, spend_histogram,
    top_category_stack, CategoryRange, CategoryTotal, Histogram, MonthCategoryPivot, MonthlyRow,
    MonthlySpend, StackedMonthly, Summary,
};
use crate::correlation::{CorrelationMatrix, NOT_ENOUGH_HISTORY};
use crate::filter::{apply, DateRange, Filters};
use crate::insights::{derive_insights, InsightContext};

pub const NO_DATA_AFTER_CLEANING: &str = "No data available after filters.";
pub const NO_DATA_FOR_FILTERS: &str = "No data available for the selected filters.";

/// Sizes and thresholds of the report views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub top_bar_categories: usize,
    pub top_table_categories: usize,
    pub top_stacked_categories: usize,
    pub top_range_categories: usize,
    pub histogram_bin: f64,
    pub min_correlation_months: usize,
    pub max_insights: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_bar_categories: 12,
            top_table_categories: 10,
            top_stacked_categories: 6,
            top_range_categories: 10,
            histogram_bin: 2000.0,
            min_correlation_months: 4,
            max_insights: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlations {
    pub matrix: CorrelationMatrix,
    pub caption: String,
}

/// Every view of the filtered data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub date_range: DateRange,
    pub summary: Summary,
    pub monthly: Vec<MonthlySpend>,
    /// All categories, biggest first
    pub category_totals: Vec<CategoryTotal>,
    pub top_bar_categories: usize,
    pub top_table_categories: usize,
    pub stacked: StackedMonthly,
    pub histogram: Histogram,
    pub ranges: Vec<CategoryRange>,
    pub monthly_table: Vec<MonthlyRow>,
    pub correlations: Option<Correlations>,
    /// Shown instead of the heatmap when there is too little history
    pub correlation_notice: Option<String>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardOutcome {
    /// Nothing to show; carries the user-facing warning
    Empty(String),
    Ready(Box<Dashboard>),
}

impl Dashboard {
    /// Filter `txns` and build every view. `txns` are the cleaned transactions.
    pub fn build(txns: &[Transaction], filters: &Filters, opts: &ReportOptions) -> DashboardOutcome {
        if txns.is_empty() {
            return DashboardOutcome::Empty(NO_DATA_AFTER_CLEANING.to_string());
        }

        let filtered = apply(txns, filters);
        // the selected range, defaulting to the span of the unfiltered data
        let date_range = match filters.date_range.or_else(|| DateRange::spanning(txns)) {
            Some(r) if !filtered.is_empty() => r,
            _ => return DashboardOutcome::Empty(NO_DATA_FOR_FILTERS.to_string()),
        };
        debug!(total = txns.len(), kept = filtered.len(), "filters applied");

        let monthly = monthly_spend(&filtered);
        let summary = Summary::compute(&filtered, &monthly);
        let totals = category_totals(&filtered);
        let pivot = MonthCategoryPivot::build(&filtered);

        let stacked = top_category_stack(&pivot, &totals, opts.top_stacked_categories);
        let histogram = spend_histogram(&monthly, opts.histogram_bin);
        let ranges = category_ranges(&pivot, &totals, opts.top_range_categories);
        let table = monthly_table(&monthly);

        let matrix = CorrelationMatrix::compute(&pivot, opts.min_correlation_months);
        let correlation_lines = matrix.as_ref().map(|m| m.summary()).unwrap_or_default();
        let correlation_notice = matrix.is_none().then(|| NOT_ENOUGH_HISTORY.to_string());
        let correlations = matrix.map(|matrix| Correlations {
            caption: matrix.caption(),
            matrix,
        });

        let insights = derive_insights(&InsightContext {
            date_range,
            monthly: &monthly,
            totals: &totals,
            total_spend: summary.total_spend,
            pivot: &pivot,
            correlation: &correlation_lines,
            max_insights: opts.max_insights,
        });

        DashboardOutcome::Ready(Box::new(Dashboard {
            date_range,
            summary,
            monthly,
            category_totals: totals,
            top_bar_categories: opts.top_bar_categories,
            top_table_categories: opts.top_table_categories,
            stacked,
            histogram,
            ranges,
            monthly_table: table,
            correlations,
            correlation_notice,
            insights,
        }))
    }

    /// Categories for the bar chart
    pub fn bar_categories(&self) -> &[CategoryTotal] {
        let n = self.top_bar_categories.min(self.category_totals.len());
        &self.category_totals[..n]
    }

    /// Categories for the top-categories table
    pub fn table_categories(&self) -> &[CategoryTotal] {
        let n = self.top_table_categories.min(self.category_totals.len());
        &self.category_totals[..n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use spendview_core::TxnType;

    fn t(m: u32, d: u32, cat: &str, spend: f64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, m, d).unwrap(),
            Some(-spend),
            TxnType::Debit,
            cat,
        )
    }

    #[test]
    fn test_empty_dataset_warning() {
        let out = Dashboard::build(&[], &Filters::default(), &ReportOptions::default());
        assert_eq!(out, DashboardOutcome::Empty(NO_DATA_AFTER_CLEANING.to_string()));
    }

    #[test]
    fn test_filters_excluding_everything() {
        let txns = vec![t(1, 26, "a", 5.0)];
        let filters = Filters {
            categories: ["zzz".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let out = Dashboard::build(&txns, &filters, &ReportOptions::default());
        assert_eq!(out, DashboardOutcome::Empty(NO_DATA_FOR_FILTERS.to_string()));
    }

    #[test]
    fn test_small_dataset_has_notice_instead_of_matrix() {
        let txns = vec![t(1, 26, "a", 5.0), t(2, 26, "b", 7.0)];
        let DashboardOutcome::Ready(d) =
            Dashboard::build(&txns, &Filters::default(), &ReportOptions::default())
        else {
            panic!("expected a dashboard");
        };
        assert!(d.correlations.is_none());
        assert_eq!(d.correlation_notice.as_deref(), Some(NOT_ENOUGH_HISTORY));
        assert_eq!(d.summary.total_spend, 12.0);
        assert_eq!(d.bar_categories().len(), 2);
        assert!(d.insights[0].starts_with("Date range: 2025-01-26 to 2025-02-26"));
    }

    #[test]
    fn test_zero_bin_width_builds_without_histogram() {
        let txns = vec![t(1, 26, "a", 5.0)];
        let opts = ReportOptions {
            histogram_bin: 0.0,
            ..Default::default()
        };
        let DashboardOutcome::Ready(d) = Dashboard::build(&txns, &Filters::default(), &opts) else {
            panic!("expected a dashboard");
        };
        assert!(d.histogram.is_empty());
        assert_eq!(d.summary.total_spend, 5.0);
    }

    #[test]
    fn test_dashboard_serializes() {
        let txns = vec![t(1, 26, "a", 5.0)];
        let DashboardOutcome::Ready(d) =
            Dashboard::build(&txns, &Filters::default(), &ReportOptions::default())
        else {
            panic!("expected a dashboard");
        };
        let json = serde_json::to_value(&*d).unwrap();
        assert_eq!(json["summary"]["transactions"], 1);
        assert_eq!(json["monthly"][0]["month"]["month"], 1);
    }
}
