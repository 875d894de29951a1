use thiserror::Error;

/// Typed failure modes of the ingestion layer
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("sheet range {0} returned no rows")]
    EmptySheet(String),

    #[error("built without Google Sheets support; rebuild with `--features gsheets`")]
    SheetsDisabled,

    #[error("no Google credentials: set GOOGLE_CREDENTIALS_JSON or configure a credentials file")]
    Credentials,
}

/// Untyped tabular data as read from a source (first row = headers).
///
/// [`RawTable::new`] squares every row to `headers.len()` cells; tables built
/// by hand may be ragged, so readers treat a missing cell as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table, trimming header names and squaring ragged rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by (trimmed) header name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }

    /// Like [`RawTable::column`] but errors when the column is absent
    pub fn require_column(&self, name: &str) -> Result<usize, IngestError> {
        self.column(name)
            .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
    }

    /// Cell at `row` in column `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column(name)?;
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_headers_trimmed_and_rows_squared() {
        let t = RawTable::new(
            strings(&[" date", "amount ", "type"]),
            vec![strings(&["2025-01-02"]), strings(&["a", "b", "c", "d"])],
        );
        assert_eq!(t.headers, strings(&["date", "amount", "type"]));
        assert_eq!(t.rows[0], strings(&["2025-01-02", "", ""]));
        assert_eq!(t.rows[1].len(), 3);
        assert_eq!(t.get(1, "type"), Some("c"));
        assert_eq!(t.get(0, "category"), None);
    }

    #[test]
    fn test_get_on_ragged_literal() {
        let t = RawTable {
            headers: strings(&["date", "amount"]),
            rows: vec![strings(&["2025-01-27"])],
        };
        assert_eq!(t.get(0, "date"), Some("2025-01-27"));
        assert_eq!(t.get(0, "amount"), None);
        assert_eq!(t.get(1, "date"), None);
    }

    #[test]
    fn test_require_column() {
        let t = RawTable::new(strings(&["date"]), vec![]);
        assert!(t.is_empty());
        assert_eq!(t.require_column("date").unwrap(), 0);
        let err = t.require_column("amount").unwrap_err();
        assert_eq!(err.to_string(), "missing required column 'amount'");
    }
}
