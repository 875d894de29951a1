//! Plain-text rendering of a [`Dashboard`] for `spendview report`.

use spendview_core::{format_currency, format_grouped, format_percent};
use spendview_finance::Dashboard;
use std::fmt::{self, Write};

const BAR_WIDTH: usize = 30;

/// Horizontal bar scaled against `max`
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.clamp(1, width))
}

/// Left-aligned first column, right-aligned numbers
fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == 0 {
                    format!("{:<w$}", c, w = widths[i])
                } else {
                    format!("{:>w$}", c, w = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&rule[..]));
    out.push('\n');
    for r in rows {
        out.push_str(&line(r.as_slice()));
        out.push('\n');
    }
    out
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn opt_currency(v: Option<f64>) -> String {
    v.map(format_currency).unwrap_or_default()
}

fn opt_percent(v: Option<f64>) -> String {
    v.map(format_percent).unwrap_or_default()
}

pub fn render_text(d: &Dashboard, source: &str) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let s = &d.summary;

    writeln!(out, "# Expenses Explorer\n")?;
    writeln!(out, "Source: {source}")?;
    writeln!(out, "Range:  {} to {}\n", d.date_range.start, d.date_range.end)?;
    writeln!(
        out,
        "Total Spend {}  |  Avg Monthly Spend {}  |  Transactions {}\n",
        format_currency(s.total_spend),
        format_currency(s.avg_monthly_spend),
        format_grouped(s.transactions as f64, 0)
    )?;

    writeln!(out, "## Monthly Spend\n")?;
    let max_month = d.monthly.iter().map(|m| m.spend).fold(0.0, f64::max);
    let rows: Vec<Vec<String>> = d
        .monthly
        .iter()
        .map(|m| {
            vec![
                m.month.to_string(),
                format_currency(m.spend),
                bar(m.spend, max_month, BAR_WIDTH),
            ]
        })
        .collect();
    out.push_str(&table(&headers(&["month", "spend", ""]), &rows));

    writeln!(out, "\n## Top {} Categories by Spend\n", d.top_bar_categories)?;
    let max_cat = d.bar_categories().first().map(|c| c.spend).unwrap_or(0.0);
    let rows: Vec<Vec<String>> = d
        .bar_categories()
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                format_currency(c.spend),
                bar(c.spend, max_cat, BAR_WIDTH),
            ]
        })
        .collect();
    out.push_str(&table(&headers(&["category", "spend", ""]), &rows));

    writeln!(out, "\n## Monthly Spend by Top Categories\n")?;
    let mut stacked_headers = vec!["month".to_string()];
    stacked_headers.extend(d.stacked.categories.iter().cloned());
    stacked_headers.push("total".to_string());
    let rows: Vec<Vec<String>> = d
        .stacked
        .rows
        .iter()
        .map(|r| {
            let mut row = vec![r.month.to_string()];
            row.extend(r.values.iter().map(|v| format_currency(*v)));
            row.push(format_currency(r.values.iter().sum()));
            row
        })
        .collect();
    out.push_str(&table(&stacked_headers, &rows));

    writeln!(out, "\n## Distribution of Monthly Spend\n")?;
    let h = &d.histogram;
    if h.is_empty() {
        writeln!(out, "(no months)")?;
    } else {
        let max_count = h.counts.iter().copied().max().unwrap_or(0) as f64;
        let rows: Vec<Vec<String>> = h
            .counts
            .iter()
            .enumerate()
            .map(|(i, c)| {
                vec![
                    format!("{} - {}", format_currency(h.edges[i]), format_currency(h.edges[i + 1])),
                    c.to_string(),
                    bar(*c as f64, max_count, BAR_WIDTH),
                ]
            })
            .collect();
        out.push_str(&table(&headers(&["monthly spend", "months", ""]), &rows));
        let ticks: Vec<String> = h.ticks.iter().map(|t| format_currency(*t)).collect();
        writeln!(out, "ticks: {}", ticks.join(" "))?;
    }

    writeln!(out, "\n## Monthly Spend Range by Top Categories\n")?;
    let rows: Vec<Vec<String>> = d
        .ranges
        .iter()
        .map(|r| {
            vec![
                r.category.clone(),
                r.months.to_string(),
                format_currency(r.min),
                format_currency(r.q1),
                format_currency(r.median),
                format_currency(r.q3),
                format_currency(r.max),
                r.outliers.len().to_string(),
            ]
        })
        .collect();
    out.push_str(&table(
        &headers(&["category", "months", "min", "q1", "median", "q3", "max", "outliers"]),
        &rows,
    ));

    writeln!(out, "\n## Tables\n\n**Monthly**\n")?;
    let rows: Vec<Vec<String>> = d
        .monthly_table
        .iter()
        .map(|r| {
            vec![
                r.month.first_day().to_string(),
                format_currency(r.spend),
                opt_currency(r.mom_change),
                opt_percent(r.mom_change_pct),
            ]
        })
        .collect();
    out.push_str(&table(
        &headers(&["month_start", "spend", "mom_change", "mom_change_pct"]),
        &rows,
    ));

    writeln!(out, "\n**Top Categories**\n")?;
    let rows: Vec<Vec<String>> = d
        .table_categories()
        .iter()
        .map(|c| vec![c.category.clone(), format_currency(c.spend)])
        .collect();
    out.push_str(&table(&headers(&["category", "spend"]), &rows));

    writeln!(out, "\n## Category Correlations\n")?;
    match (&d.correlations, &d.correlation_notice) {
        (Some(c), _) => {
            let m = &c.matrix;
            let mut corr_headers = vec![String::new()];
            corr_headers.extend(m.categories.iter().cloned());
            let rows: Vec<Vec<String>> = m
                .categories
                .iter()
                .enumerate()
                .map(|(i, cat)| {
                    let mut row = vec![cat.clone()];
                    row.extend((0..m.categories.len()).map(|j| match m.heatmap_cell(i, j) {
                        Some(v) => format!("{v:.2}"),
                        None => "-".to_string(),
                    }));
                    row
                })
                .collect();
            out.push_str(&table(&corr_headers, &rows));
            writeln!(out, "\n{}", c.caption)?;
        }
        (None, Some(notice)) => {
            writeln!(out, "{notice}")?;
        }
        (None, None) => {}
    }

    writeln!(out, "\n## Insights\n")?;
    for point in &d.insights {
        writeln!(out, "- {point}")?;
    }

    Ok(out)
}
