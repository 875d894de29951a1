//! Short textual takeaways shown under the charts.

use spendview_core::{format_currency, format_percent};

use crate::aggregate::{CategoryTotal, MonthCategoryPivot, MonthlySpend};
use crate::filter::DateRange;
use crate::stats::median;

/// Everything the insight rules look at
pub struct InsightContext<'a> {
    pub date_range: DateRange,
    pub monthly: &'a [MonthlySpend],
    pub totals: &'a [CategoryTotal],
    pub total_spend: f64,
    pub pivot: &'a MonthCategoryPivot,
    /// Correlation sentences (already derived), at most two are used
    pub correlation: &'a [String],
    pub max_insights: usize,
}

/// Largest absolute month-over-month change of a column, as a fraction.
///
/// Gaps are carried forward from the last known month; changes from a zero
/// month are undefined and skipped.
pub fn max_abs_pct_change(column: &[Option<f64>]) -> Option<f64> {
    let mut last: Option<f64> = None;
    let mut best: Option<f64> = None;
    for cell in column {
        let current = cell.or(last);
        if let (Some(prev), Some(cur)) = (last, current) {
            if prev != 0.0 {
                let change = (cur / prev - 1.0).abs();
                if change.is_finite() && best.is_none_or(|b| change > b) {
                    best = Some(change);
                }
            }
        }
        last = current;
    }
    best
}

/// First entry with the smallest (or largest) value
fn pick<'a>(items: &[(&'a str, f64)], largest: bool) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for &(name, v) in items {
        let better = match best {
            None => true,
            Some((_, b)) if largest => v > b,
            Some((_, b)) => v < b,
        };
        if better {
            best = Some((name, v));
        }
    }
    best
}

pub fn derive_insights(ctx: &InsightContext<'_>) -> Vec<String> {
    let mut insights = Vec::new();

    insights.push(format!(
        "Date range: {} to {} across {} months.",
        ctx.date_range.start,
        ctx.date_range.end,
        ctx.monthly.len()
    ));

    let monthly_values: Vec<f64> = ctx.monthly.iter().map(|m| m.spend).collect();
    if let Some(med) = median(&monthly_values) {
        insights.push(format!("Median monthly spend: {}.", format_currency(med)));
    }

    if let Some(top) = ctx.totals.first().filter(|_| ctx.total_spend > 0.0) {
        let share = top.spend / ctx.total_spend * 100.0;
        insights.push(format!(
            "Top category is '{}' at {} ({} of spend).",
            top.category,
            format_currency(top.spend),
            format_percent(share)
        ));
    }

    let valid: Vec<&String> = ctx
        .pivot
        .categories()
        .iter()
        .filter(|c| ctx.pivot.count(c) >= 2)
        .collect();

    let ranges: Vec<(&str, f64)> = valid
        .iter()
        .map(|c| {
            let present = ctx.pivot.present(c);
            let hi = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let lo = present.iter().copied().fold(f64::INFINITY, f64::min);
            (c.as_str(), hi - lo)
        })
        .collect();

    if let (Some((stable, stable_range)), Some((variable, var_range))) =
        (pick(&ranges, false), pick(&ranges, true))
    {
        insights.push(format!(
            "Most stable category: '{}' with a {} monthly range.",
            stable,
            format_currency(stable_range)
        ));

        let pct_changes: Vec<(&str, f64)> = valid
            .iter()
            .filter_map(|c| max_abs_pct_change(&ctx.pivot.column(c)).map(|p| (c.as_str(), p)))
            .collect();
        let mut line = format!(
            "Most variable category: '{}' with a {} range",
            variable,
            format_currency(var_range)
        );
        match pick(&pct_changes, true) {
            Some((cat, pct)) => line.push_str(&format!(
                "; largest MoM % change in '{}' at {}.",
                cat,
                format_percent(pct * 100.0)
            )),
            None => line.push('.'),
        }
        insights.push(line);
    }

    let correlation: Vec<String> = ctx.correlation.iter().take(2).cloned().collect();
    let keep = ctx.max_insights.saturating_sub(correlation.len());
    insights.truncate(keep);
    insights.extend(correlation);
    insights
}
