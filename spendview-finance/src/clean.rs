//! Cleaning rules turning a raw sheet into spend transactions.
//!
//! Order matters: month coverage is judged on every dated row, before the
//! debit/category filters run.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use spendview_core::{Month, Transaction, TxnType};
use spendview_ingest::RawTable;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::debug;

pub const UNCATEGORIZED: &str = "(uncategorized)";

/// Knobs for [`clean`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// A month counts only if data reaches at least this day of the month
    pub coverage_min_day: u32,
    /// Lowercase category names that are not spending (transfers, investments, ...)
    pub excluded_categories: BTreeSet<String>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            coverage_min_day: 25,
            excluded_categories: ["transfer/pmt", "investment", "rental inc"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// two-digit years first: %Y would happily read "25" as year 25
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date cell; anything unrecognized is treated as missing.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn amount_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<open>\()?(?P<sign>[-+])?\$?",
            r"(?P<num>(?:\d[\d,]*(?:\.\d+)?|\.\d+)(?:[eE][-+]?\d+)?)",
            r"(?P<close>\))?$",
        ))
        .ok()
    })
    .as_ref()
}

/// Parse an amount cell. Accepts `$`, thousands commas, exponents and `(12.34)` negatives.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s: String = raw.trim().chars().filter(|c| !c.is_whitespace()).collect();
    let caps = amount_re()?.captures(&s)?;
    let parens = caps.name("open").is_some();
    if parens != caps.name("close").is_some() {
        return None;
    }
    let value: f64 = caps["num"].replace(',', "").parse().ok()?;
    let negative = parens ^ (caps.name("sign").map(|m| m.as_str()) == Some("-"));
    Some(if negative { -value } else { value })
}

/// Trimmed, lowercase category; blank becomes `(uncategorized)`.
pub fn normalize_category(raw: &str) -> String {
    let c = raw.trim().to_lowercase();
    if c.is_empty() {
        UNCATEGORIZED.to_string()
    } else {
        c
    }
}

/// Months whose latest dated row falls on or after `min_day`
pub fn coverage_months(dates: impl IntoIterator<Item = NaiveDate>, min_day: u32) -> BTreeSet<Month> {
    let mut latest: BTreeMap<Month, NaiveDate> = BTreeMap::new();
    for d in dates {
        latest
            .entry(Month::of(d))
            .and_modify(|m| *m = (*m).max(d))
            .or_insert(d);
    }
    latest
        .into_iter()
        .filter(|(_, last)| last.day() >= min_day)
        .map(|(m, _)| m)
        .collect()
}

/// Short rows read as blank cells
fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// Clean a raw table into debit spend transactions.
pub fn clean(table: &RawTable, opts: &CleanOptions) -> Result<Vec<Transaction>> {
    let date_col = table.require_column("date")?;
    let amount_col = table.require_column("amount")?;
    let type_col = table.require_column("type")?;
    let category_col = table.require_column("category")?;

    let dated: Vec<(NaiveDate, &Vec<String>)> = table
        .rows
        .iter()
        .filter_map(|r| parse_date(cell(r, date_col)).map(|d| (d, r)))
        .collect();
    let undated = table.len() - dated.len();

    let covered = coverage_months(dated.iter().map(|(d, _)| *d), opts.coverage_min_day);

    let mut out = Vec::new();
    let mut dropped_uncovered = 0usize;
    let mut dropped_type = 0usize;
    let mut dropped_category = 0usize;

    for (date, row) in dated {
        if !covered.contains(&Month::of(date)) {
            dropped_uncovered += 1;
            continue;
        }

        let txn_type = TxnType::parse(cell(row, type_col));
        if txn_type != TxnType::Debit {
            dropped_type += 1;
            continue;
        }

        let category = normalize_category(cell(row, category_col));
        if opts.excluded_categories.contains(&category) {
            dropped_category += 1;
            continue;
        }

        out.push(Transaction::new(
            date,
            parse_amount(cell(row, amount_col)),
            txn_type,
            category,
        ));
    }

    debug!(
        kept = out.len(),
        undated,
        dropped_uncovered,
        dropped_type,
        dropped_category,
        months = covered.len(),
        "cleaned transactions"
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[&str; 4]]) -> RawTable {
        RawTable::new(
            ["date", "amount", "type", "category"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2025-03-07"), Some(d(2025, 3, 7)));
        assert_eq!(parse_date("03/07/2025"), Some(d(2025, 3, 7)));
        assert_eq!(parse_date("3/7/25"), Some(d(2025, 3, 7)));
        assert_eq!(parse_date("2025/03/07"), Some(d(2025, 3, 7)));
        assert_eq!(parse_date("2025-03-07 14:22:01"), Some(d(2025, 3, 7)));
        assert_eq!(parse_date("2025-03-07T14:22"), Some(d(2025, 3, 7)));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("-12.50"), Some(-12.5));
        assert_eq!(parse_amount(" 1,234.00 "), Some(1234.0));
        assert_eq!(parse_amount("-$1,234.56"), Some(-1234.56));
        assert_eq!(parse_amount("(45.10)"), Some(-45.1));
        assert_eq!(parse_amount("+7"), Some(7.0));
        assert_eq!(parse_amount(".5"), Some(0.5));
        assert_eq!(parse_amount("-1.5e2"), Some(-150.0));
        assert_eq!(parse_amount("2E-1"), Some(0.2));
        assert_eq!(parse_amount("1e"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("(12"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("  Dining Out "), "dining out");
        assert_eq!(normalize_category("   "), UNCATEGORIZED);
    }

    #[test]
    fn test_month_ending_on_20th_is_excluded() {
        let t = table(&[
            ["2025-01-05", "-10", "DEBIT", "groceries"],
            ["2025-01-26", "-20", "DEBIT", "groceries"],
            ["2025-02-03", "-30", "DEBIT", "groceries"],
            ["2025-02-20", "-40", "DEBIT", "groceries"],
        ]);
        let txns = clean(&t, &CleanOptions::default()).unwrap();
        assert_eq!(txns.len(), 2);
        assert!(txns.iter().all(|t| t.month() == Month::new(2025, 1).unwrap()));
    }

    #[test]
    fn test_transfer_and_credit_excluded() {
        let t = table(&[
            ["2025-01-05", "-10", "DEBIT", "Transfer/Pmt"],
            ["2025-01-06", "-11", "DEBIT", " investment"],
            ["2025-01-07", "-12", "DEBIT", "Rental Inc"],
            ["2025-01-08", "500", "CREDIT", "salary"],
            ["2025-01-27", "-13", "debit", "Dining"],
        ]);
        let txns = clean(&t, &CleanOptions::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].category, "dining");
        assert_eq!(txns[0].spend(), Some(13.0));
    }

    #[test]
    fn test_coverage_counts_credit_rows() {
        // Only the credit reaches the 28th, but it still marks the month as covered.
        let t = table(&[
            ["2025-04-02", "-15", "DEBIT", "fuel"],
            ["2025-04-28", "900", "CREDIT", "salary"],
        ]);
        let txns = clean(&t, &CleanOptions::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].category, "fuel");
    }

    #[test]
    fn test_malformed_values_coerced() {
        let t = table(&[
            ["garbage", "-10", "DEBIT", "fuel"],
            ["2025-05-10", "n/a", "DEBIT", ""],
            ["2025-05-30", "-5", "DEBIT", "fuel"],
        ]);
        let txns = clean(&t, &CleanOptions::default()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].amount, None);
        assert_eq!(txns[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_missing_column_errors() {
        let t = RawTable::new(vec!["date".into(), "amount".into()], vec![]);
        let err = clean(&t, &CleanOptions::default()).unwrap_err();
        assert!(err.to_string().contains("'type'"));
    }

    #[test]
    fn test_short_rows_read_as_blank() {
        let t = RawTable {
            headers: ["date", "amount", "type", "category"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: vec![
                vec!["2025-01-27".to_string()],
                vec!["2025-01-28".into(), "-9".into(), "DEBIT".into()],
            ],
        };
        let txns = clean(&t, &CleanOptions::default()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].spend(), Some(9.0));
        assert_eq!(txns[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_coverage_threshold_is_configurable() {
        let dates = [d(2025, 6, 21), d(2025, 7, 31)];
        let strict = coverage_months(dates, 25);
        assert_eq!(strict.len(), 1);
        let loose = coverage_months(dates, 20);
        assert_eq!(loose.len(), 2);
    }
}
