//! Transaction record types and the calendar-month bucket they roll up into

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cleaned spending transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Date of the transaction (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Signed amount as it appears in the source; debits are negative.
    /// `None` when the source cell was not a number.
    pub amount: Option<f64>,
    /// Debit/credit marker from the `type` column
    pub txn_type: TxnType,
    /// Normalized (trimmed, lowercase) category
    pub category: String,
}

impl Transaction {
    /// Create a new Transaction
    pub fn new(
        date: NaiveDate,
        amount: Option<f64>,
        txn_type: TxnType,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            txn_type,
            category: category.into(),
        }
    }

    /// Month bucket this transaction falls into
    pub fn month(&self) -> Month {
        Month::of(self.date)
    }

    /// Spend expressed as a positive value (negated amount)
    pub fn spend(&self) -> Option<f64> {
        self.amount.map(|a| -a)
    }
}

/// Transaction direction as recorded in the source sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TxnType {
    #[serde(rename = "debit")]
    Debit,
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "other")]
    Other(String),
}

impl TxnType {
    /// Parse the raw `type` cell. Matching ignores case and surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let t = raw.trim();
        match t.to_uppercase().as_str() {
            "DEBIT" => TxnType::Debit,
            "CREDIT" => TxnType::Credit,
            _ => TxnType::Other(t.to_string()),
        }
    }
}

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month
    pub fn last_day(&self) -> NaiveDate {
        self.succ()
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    /// The following month
    pub fn succ(&self) -> Self {
        Self::of(
            self.first_day()
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        )
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_spend_is_negated_amount() {
        let t = Transaction::new(d(2025, 3, 4), Some(-42.5), TxnType::Debit, "groceries");
        assert_eq!(t.spend(), Some(42.5));
        assert_eq!(t.txn_type, TxnType::Debit);

        let missing = Transaction::new(d(2025, 3, 4), None, TxnType::Debit, "groceries");
        assert_eq!(missing.spend(), None);
    }

    #[test]
    fn test_txn_type_parse() {
        assert_eq!(TxnType::parse(" debit "), TxnType::Debit);
        assert_eq!(TxnType::parse("CREDIT"), TxnType::Credit);
        assert_eq!(TxnType::parse("Hold"), TxnType::Other("Hold".to_string()));
    }

    #[test]
    fn test_month_bounds_and_order() {
        let feb = Month::of(d(2024, 2, 10));
        assert_eq!(feb.to_string(), "2024-02");
        assert_eq!(feb.first_day(), d(2024, 2, 1));
        assert_eq!(feb.last_day(), d(2024, 2, 29));

        let dec = Month::new(2024, 12).unwrap();
        assert_eq!(dec.succ(), Month::new(2025, 1).unwrap());
        assert!(feb < dec);
        assert!(Month::new(2024, 13).is_none());
    }

    #[test]
    fn test_serde_shape() {
        let t = Transaction::new(d(2025, 1, 30), Some(-10.0), TxnType::Debit, "dining");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["txn_type"], "debit");
        assert_eq!(json["date"], "2025-01-30");
    }
}
