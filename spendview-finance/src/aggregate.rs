//! Group-by and pivot views over filtered transactions.
//!
//! Missing spends are skipped by every sum; a group whose rows all lack an
//! amount still exists and sums to 0.

use serde::Serialize;
use spendview_core::{Month, Transaction};
use std::collections::{BTreeMap, BTreeSet};

use crate::stats::{mean, median, quantile};

/// Sum of all spend
pub fn total_spend(txns: &[Transaction]) -> f64 {
    txns.iter().filter_map(Transaction::spend).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpend {
    pub month: Month,
    pub spend: f64,
}

/// Spend per month, ascending by month
pub fn monthly_spend(txns: &[Transaction]) -> Vec<MonthlySpend> {
    let mut by_month: BTreeMap<Month, f64> = BTreeMap::new();
    for t in txns {
        *by_month.entry(t.month()).or_insert(0.0) += t.spend().unwrap_or(0.0);
    }
    by_month
        .into_iter()
        .map(|(month, spend)| MonthlySpend { month, spend })
        .collect()
}

/// Headline metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_spend: f64,
    pub avg_monthly_spend: f64,
    pub median_monthly_spend: f64,
    /// Row count, including rows without a usable amount
    pub transactions: usize,
    pub months: usize,
}

impl Summary {
    pub fn compute(txns: &[Transaction], monthly: &[MonthlySpend]) -> Self {
        let values: Vec<f64> = monthly.iter().map(|m| m.spend).collect();
        Self {
            total_spend: total_spend(txns),
            avg_monthly_spend: mean(&values).unwrap_or(0.0),
            median_monthly_spend: median(&values).unwrap_or(0.0),
            transactions: txns.len(),
            months: monthly.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub spend: f64,
}

/// Spend per category, largest first (ties alphabetical)
pub fn category_totals(txns: &[Transaction]) -> Vec<CategoryTotal> {
    let mut by_cat: BTreeMap<&str, f64> = BTreeMap::new();
    for t in txns {
        *by_cat.entry(t.category.as_str()).or_insert(0.0) += t.spend().unwrap_or(0.0);
    }
    let mut totals: Vec<CategoryTotal> = by_cat
        .into_iter()
        .map(|(category, spend)| CategoryTotal {
            category: category.to_string(),
            spend,
        })
        .collect();
    // stable sort keeps the alphabetical order of equal totals
    totals.sort_by(|a, b| b.spend.total_cmp(&a.spend));
    totals
}

/// Names of the `n` biggest categories
pub fn top_categories(totals: &[CategoryTotal], n: usize) -> Vec<String> {
    totals.iter().take(n).map(|c| c.category.clone()).collect()
}

/// Month × category spend matrix. A cell is `None` when no row exists for the pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCategoryPivot {
    months: Vec<Month>,
    categories: Vec<String>,
    /// `cells[month][category]`
    cells: Vec<Vec<Option<f64>>>,
}

impl MonthCategoryPivot {
    pub fn build(txns: &[Transaction]) -> Self {
        let months: Vec<Month> = txns
            .iter()
            .map(Transaction::month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let categories: Vec<String> = txns
            .iter()
            .map(|t| t.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![None; categories.len()]; months.len()];
        for t in txns {
            let (Ok(mi), Ok(ci)) = (
                months.binary_search(&t.month()),
                categories.binary_search(&t.category),
            ) else {
                continue;
            };
            let cell: &mut Option<f64> = &mut cells[mi][ci];
            *cell = Some(cell.unwrap_or(0.0) + t.spend().unwrap_or(0.0));
        }

        Self {
            months,
            categories,
            cells,
        }
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    pub fn cell(&self, month: usize, category: usize) -> Option<f64> {
        self.cells.get(month).and_then(|r| r.get(category)).copied().flatten()
    }

    /// One column, aligned with [`MonthCategoryPivot::months`]
    pub fn column(&self, category: &str) -> Vec<Option<f64>> {
        match self.index_of(category) {
            Some(ci) => self.cells.iter().map(|r| r[ci]).collect(),
            None => vec![None; self.months.len()],
        }
    }

    /// Present (non-missing) values of one column
    pub fn present(&self, category: &str) -> Vec<f64> {
        self.column(category).into_iter().flatten().collect()
    }

    /// Number of months with data for `category`
    pub fn count(&self, category: &str) -> usize {
        self.column(category).iter().filter(|c| c.is_some()).count()
    }

    /// Column with gaps filled with 0
    pub fn filled(&self, category: &str) -> Vec<f64> {
        self.column(category)
            .into_iter()
            .map(|c| c.unwrap_or(0.0))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedRow {
    pub month: Month,
    /// Aligned with [`StackedMonthly::categories`]
    pub values: Vec<f64>,
}

/// Monthly spend split across the top categories (gaps as 0)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedMonthly {
    pub categories: Vec<String>,
    pub rows: Vec<StackedRow>,
}

pub fn top_category_stack(
    pivot: &MonthCategoryPivot,
    totals: &[CategoryTotal],
    n: usize,
) -> StackedMonthly {
    let categories = top_categories(totals, n);
    let columns: Vec<Vec<f64>> = categories.iter().map(|c| pivot.filled(c)).collect();
    let rows = pivot
        .months()
        .iter()
        .enumerate()
        .map(|(mi, month)| StackedRow {
            month: *month,
            values: columns.iter().map(|col| col[mi]).collect(),
        })
        .collect();
    StackedMonthly { categories, rows }
}

/// Fixed-width histogram of monthly spend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bin_width: f64,
    /// `counts.len() + 1` edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Axis ticks every two bins
    pub ticks: Vec<f64>,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Bins start at the bin boundary below the smallest month and end one full
/// bin above the largest. Bins are half-open except the last.
/// A non-positive or non-finite `bin_width` gives an empty histogram.
pub fn spend_histogram(monthly: &[MonthlySpend], bin_width: f64) -> Histogram {
    let empty = Histogram {
        bin_width,
        edges: Vec::new(),
        counts: Vec::new(),
        ticks: Vec::new(),
    };
    if !(bin_width.is_finite() && bin_width > 0.0) {
        return empty;
    }

    let values: Vec<f64> = monthly
        .iter()
        .map(|m| m.spend)
        .filter(|v| v.is_finite())
        .collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return empty;
    };

    let low = (min / bin_width).floor() * bin_width;
    let high = ((max / bin_width).floor() + 1.0) * bin_width;
    let bins = ((high - low) / bin_width).round() as usize;

    let edges: Vec<f64> = (0..=bins).map(|i| low + i as f64 * bin_width).collect();
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - low) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let tick_step = bin_width * 2.0;
    let ticks = (0..)
        .map(|i| low + i as f64 * tick_step)
        .take_while(|t| *t <= high)
        .collect();

    Histogram {
        bin_width,
        edges,
        counts,
        ticks,
    }
}

/// Box-plot statistics of one category's monthly spend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRange {
    pub category: String,
    pub months: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values within 1.5 IQR of the quartiles
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl CategoryRange {
    pub fn from_values(category: &str, values: &[f64]) -> Option<Self> {
        let q1 = quantile(values, 0.25)?;
        let q3 = quantile(values, 0.75)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = values.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let whisker_low = inside.clone().reduce(f64::min).unwrap_or(q1);
        let whisker_high = inside.reduce(f64::max).unwrap_or(q3);

        let mut outliers: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();
        outliers.sort_by(f64::total_cmp);

        Some(Self {
            category: category.to_string(),
            months: values.len(),
            min: values.iter().copied().reduce(f64::min)?,
            q1,
            median: median(values)?,
            q3,
            max: values.iter().copied().reduce(f64::max)?,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    /// max - min
    pub fn spread(&self) -> f64 {
        self.max - self.min
    }
}

/// Monthly spend range for each of the top `n` categories (biggest first)
pub fn category_ranges(
    pivot: &MonthCategoryPivot,
    totals: &[CategoryTotal],
    n: usize,
) -> Vec<CategoryRange> {
    top_categories(totals, n)
        .iter()
        .filter_map(|c| CategoryRange::from_values(c, &pivot.present(c)))
        .collect()
}

/// One row of the monthly table with month-over-month deltas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub month: Month,
    pub spend: f64,
    pub mom_change: Option<f64>,
    /// Percent; `None` for the first month or when the previous month is 0
    pub mom_change_pct: Option<f64>,
}

pub fn monthly_table(monthly: &[MonthlySpend]) -> Vec<MonthlyRow> {
    let mut rows = Vec::with_capacity(monthly.len());
    let mut prev: Option<f64> = None;
    for m in monthly {
        let mom_change = prev.map(|p| m.spend - p);
        let mom_change_pct = prev
            .filter(|p| *p != 0.0)
            .map(|p| (m.spend / p - 1.0) * 100.0);
        rows.push(MonthlyRow {
            month: m.month,
            spend: m.spend,
            mom_change,
            mom_change_pct,
        });
        prev = Some(m.spend);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use spendview_core::TxnType;

    fn txn(y: i32, m: u32, d: u32, amount: Option<f64>, cat: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            amount,
            TxnType::Debit,
            cat,
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn(2025, 1, 3, Some(-100.0), "groceries"),
            txn(2025, 1, 27, Some(-50.0), "dining"),
            txn(2025, 2, 10, Some(-300.0), "groceries"),
            txn(2025, 2, 26, None, "fuel"),
            txn(2025, 3, 28, Some(-40.0), "dining"),
        ]
    }

    #[test]
    fn test_monthly_and_summary() {
        let txns = sample();
        let monthly = monthly_spend(&txns);
        assert_eq!(
            monthly.iter().map(|m| m.spend).collect::<Vec<_>>(),
            vec![150.0, 300.0, 40.0]
        );

        let s = Summary::compute(&txns, &monthly);
        assert_eq!(s.total_spend, 490.0);
        assert!((s.avg_monthly_spend - 490.0 / 3.0).abs() < 1e-9);
        assert_eq!(s.median_monthly_spend, 150.0);
        // the row with a missing amount still counts
        assert_eq!(s.transactions, 5);
        assert_eq!(s.months, 3);
    }

    #[test]
    fn test_category_totals_sorted() {
        let totals = category_totals(&sample());
        let names: Vec<_> = totals.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["groceries", "dining", "fuel"]);
        assert_eq!(totals[2].spend, 0.0);
        assert_eq!(top_categories(&totals, 2), vec!["groceries", "dining"]);
    }

    #[test]
    fn test_pivot_cells() {
        let p = MonthCategoryPivot::build(&sample());
        assert_eq!(p.categories(), &["dining", "fuel", "groceries"]);
        assert_eq!(p.column("dining"), vec![Some(50.0), None, Some(40.0)]);
        // only a missing amount, still a present cell
        assert_eq!(p.column("fuel"), vec![None, Some(0.0), None]);
        assert_eq!(p.count("groceries"), 2);
        assert_eq!(p.filled("groceries"), vec![100.0, 300.0, 0.0]);
        assert_eq!(p.column("nope"), vec![None, None, None]);
    }

    #[test]
    fn test_top_category_stack() {
        let txns = sample();
        let p = MonthCategoryPivot::build(&txns);
        let stack = top_category_stack(&p, &category_totals(&txns), 2);
        assert_eq!(stack.categories, vec!["groceries", "dining"]);
        assert_eq!(stack.rows[1].values, vec![300.0, 0.0]);
        assert_eq!(stack.rows.len(), 3);
    }

    #[test]
    fn test_histogram_bins() {
        let months = [4100.0, 5900.0, 9000.0]
            .iter()
            .enumerate()
            .map(|(i, s)| MonthlySpend {
                month: Month::new(2025, i as u32 + 1).unwrap(),
                spend: *s,
            })
            .collect::<Vec<_>>();
        let h = spend_histogram(&months, 2000.0);
        assert_eq!(h.edges, vec![4000.0, 6000.0, 8000.0, 10000.0]);
        assert_eq!(h.counts, vec![2, 0, 1]);
        assert_eq!(h.ticks, vec![4000.0, 8000.0]);

        assert!(spend_histogram(&[], 2000.0).is_empty());
    }

    #[test]
    fn test_histogram_rejects_bad_bin_width() {
        let months = vec![MonthlySpend {
            month: Month::new(2025, 1).unwrap(),
            spend: 1500.0,
        }];
        for width in [0.0, -250.0, f64::NAN, f64::INFINITY] {
            assert!(spend_histogram(&months, width).is_empty(), "width {width}");
        }
    }

    #[test]
    fn test_category_range_box_stats() {
        let r = CategoryRange::from_values("x", &[10.0, 12.0, 11.0, 13.0, 100.0]).unwrap();
        assert_eq!(r.median, 12.0);
        assert_eq!(r.q1, 11.0);
        assert_eq!(r.q3, 13.0);
        assert_eq!(r.whisker_high, 13.0);
        assert_eq!(r.outliers, vec![100.0]);
        assert_eq!(r.spread(), 90.0);
        assert!(CategoryRange::from_values("y", &[]).is_none());
    }

    #[test]
    fn test_monthly_table_mom() {
        let monthly = vec![
            MonthlySpend { month: Month::new(2025, 1).unwrap(), spend: 0.0 },
            MonthlySpend { month: Month::new(2025, 2).unwrap(), spend: 200.0 },
            MonthlySpend { month: Month::new(2025, 3).unwrap(), spend: 150.0 },
        ];
        let rows = monthly_table(&monthly);
        assert_eq!(rows[0].mom_change, None);
        assert_eq!(rows[1].mom_change, Some(200.0));
        assert_eq!(rows[1].mom_change_pct, None);
        assert_eq!(rows[2].mom_change, Some(-50.0));
        assert_eq!(rows[2].mom_change_pct, Some(-25.0));
    }
}
