//! Pairwise correlation of monthly category spend.

use serde::Serialize;

use crate::aggregate::MonthCategoryPivot;
use crate::stats::pearson;

pub const NOT_ENOUGH_HISTORY: &str =
    "Not enough category history to compute correlations. Try a wider date range or more categories.";

/// Correlation between two categories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pair {
    pub a: String,
    pub b: String,
    pub r: f64,
}

/// Square correlation matrix over the eligible categories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub categories: Vec<String>,
    /// `values[i][j]`; `None` when a pair has too little overlap or no variance
    pub values: Vec<Vec<Option<f64>>>,
    /// Months in the pivot the matrix was built from
    pub months: usize,
    pub min_months: usize,
}

impl CorrelationMatrix {
    /// Correlate every category that has data in at least `min_months` months.
    ///
    /// Each pair only uses the months where both categories are present.
    /// Returns `None` when fewer than two categories qualify.
    pub fn compute(pivot: &MonthCategoryPivot, min_months: usize) -> Option<Self> {
        let categories: Vec<String> = pivot
            .categories()
            .iter()
            .filter(|c| pivot.count(c) >= min_months)
            .cloned()
            .collect();
        if categories.len() < 2 {
            return None;
        }

        let columns: Vec<Vec<Option<f64>>> = categories.iter().map(|c| pivot.column(c)).collect();
        let n = categories.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            values[i][i] = Some(1.0);
            for j in (i + 1)..n {
                let pairs: Vec<(f64, f64)> = columns[i]
                    .iter()
                    .zip(&columns[j])
                    .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                    .collect();
                let r = pearson(&pairs);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Some(Self {
            categories,
            values,
            months: pivot.months().len(),
            min_months,
        })
    }

    /// Heatmap value: masked on the diagonal, missing shown as 0.
    pub fn heatmap_cell(&self, i: usize, j: usize) -> Option<f64> {
        if i == j {
            return None;
        }
        Some(self.values[i][j].unwrap_or(0.0))
    }

    pub fn caption(&self) -> String {
        format!(
            "Based on {} months. Showing categories with at least {} months of data.",
            self.months, self.min_months
        )
    }

    /// Strongest negative (minimum) and strongest positive (maximum) pair.
    ///
    /// Pairs are scanned in upper-triangle row-major order; the first extreme wins.
    pub fn extremes(&self) -> Option<(Pair, Pair)> {
        let mut min: Option<(usize, usize, f64)> = None;
        let mut max: Option<(usize, usize, f64)> = None;
        let n = self.categories.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let Some(r) = self.values[i][j] else { continue };
                if min.is_none_or(|(_, _, m)| r < m) {
                    min = Some((i, j, r));
                }
                if max.is_none_or(|(_, _, m)| r > m) {
                    max = Some((i, j, r));
                }
            }
        }
        let pair = |(i, j, r): (usize, usize, f64)| Pair {
            a: self.categories[i].clone(),
            b: self.categories[j].clone(),
            r,
        };
        Some((pair(min?), pair(max?)))
    }

    /// Insight sentences for the two extremes
    pub fn summary(&self) -> Vec<String> {
        match self.extremes() {
            Some((neg, pos)) => vec![
                format!(
                    "Strongest negative correlation: {} vs {} ({:.2}).",
                    neg.a, neg.b, neg.r
                ),
                format!(
                    "Strongest positive correlation: {} vs {} ({:.2}).",
                    pos.a, pos.b, pos.r
                ),
            ],
            None => Vec::new(),
        }
    }
}
