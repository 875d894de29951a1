//! Display helpers for currency, grouped numbers and percentages

/// Format with thousands separators and a fixed number of decimals.
///
/// `format_grouped(12345.678, 2)` → `12,345.68`
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Whole-unit currency: `$12,345`. Negative values render as `$-1,234`.
pub fn format_currency(value: f64) -> String {
    format!("${}", format_grouped(value, 0))
}

/// Whole-number percentage: `12%`
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_grouped(value, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping() {
        assert_eq!(format_grouped(0.0, 0), "0");
        assert_eq!(format_grouped(999.0, 0), "999");
        assert_eq!(format_grouped(1000.0, 0), "1,000");
        assert_eq!(format_grouped(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_grouped(-0.87, 2), "-0.87");
    }

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(12345.4), "$12,345");
        assert_eq!(format_currency(-1234.0), "$-1,234");
        assert_eq!(format_currency(-0.2), "$0");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(37.2), "37%");
        assert_eq!(format_percent(1520.0), "1,520%");
        assert_eq!(format_percent(f64::INFINITY), "inf%");
    }
}
