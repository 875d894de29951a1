//! User-selected filters: an inclusive date range and a category subset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spendview_core::Transaction;
use std::collections::BTreeSet;

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Smallest range covering every transaction
    pub fn spanning(txns: &[Transaction]) -> Option<Self> {
        let start = txns.iter().map(|t| t.date).min()?;
        let end = txns.iter().map(|t| t.date).max()?;
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Filters applied between cleaning and aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub date_range: Option<DateRange>,
    /// Selected categories; empty means all of them
    pub categories: BTreeSet<String>,
}

impl Filters {
    pub fn matches(&self, txn: &Transaction) -> bool {
        let in_range = self.date_range.is_none_or(|r| r.contains(txn.date));
        let in_categories = self.categories.is_empty() || self.categories.contains(&txn.category);
        in_range && in_categories
    }
}

/// Keep the transactions matching `filters`
pub fn apply(txns: &[Transaction], filters: &Filters) -> Vec<Transaction> {
    txns.iter().filter(|t| filters.matches(t)).cloned().collect()
}

/// Sorted, de-duplicated categories present in `txns`
pub fn available_categories(txns: &[Transaction]) -> Vec<String> {
    txns.iter()
        .map(|t| t.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendview_core::TxnType;

    fn txn(y: i32, m: u32, d: u32, cat: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            Some(-1.0),
            TxnType::Debit,
            cat,
        )
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let txns = vec![
            txn(2025, 1, 1, "a"),
            txn(2025, 1, 31, "b"),
            txn(2025, 2, 1, "a"),
        ];
        let filters = Filters {
            date_range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            )),
            ..Default::default()
        };
        assert_eq!(apply(&txns, &filters).len(), 2);
    }

    #[test]
    fn test_empty_category_selection_keeps_all() {
        let txns = vec![txn(2025, 1, 1, "a"), txn(2025, 1, 2, "b")];
        assert_eq!(apply(&txns, &Filters::default()).len(), 2);

        let only_b = Filters {
            categories: ["b".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let kept = apply(&txns, &only_b);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category, "b");
    }

    #[test]
    fn test_spanning_and_categories() {
        assert!(DateRange::spanning(&[]).is_none());
        let txns = vec![txn(2025, 3, 9, "z"), txn(2024, 12, 1, "a"), txn(2025, 1, 1, "z")];
        let r = DateRange::spanning(&txns).unwrap();
        assert_eq!(r.start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(r.end, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(available_categories(&txns), vec!["a", "z"]);
    }
}
