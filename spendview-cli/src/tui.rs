use anyhow::Result;
use chrono::{Months, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span, Text},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, List,
        ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame, Terminal,
};
use spendview_core::{format_currency, format_grouped, format_percent, Month, Transaction};
use spendview_finance::{
    available_categories, Dashboard, DashboardOutcome, DateRange, Filters, ReportOptions,
};
use std::collections::BTreeSet;
use std::io;
use tracing::{info, warn};

use crate::session::Session;

const TABS: [&str; 6] = [
    "Overview",
    "Categories",
    "Distribution",
    "Tables",
    "Correlations",
    "Insights",
];

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Reload,
}

/// Dashboard state: the cleaned rows, the sidebar filters and the derived view
pub struct App {
    source: String,
    opts: ReportOptions,
    txns: Vec<Transaction>,
    /// Span of the cleaned data; the date filter is clamped to it
    bounds: Option<DateRange>,
    range: Option<DateRange>,
    categories: Vec<String>,
    selected: BTreeSet<String>,
    cursor: usize,
    tab: usize,
    status: String,
    view: DashboardOutcome,
}

impl App {
    pub fn new(source: impl Into<String>, txns: Vec<Transaction>, opts: ReportOptions) -> Self {
        let mut app = Self {
            source: source.into(),
            opts,
            txns: Vec::new(),
            bounds: None,
            range: None,
            categories: Vec::new(),
            selected: BTreeSet::new(),
            cursor: 0,
            tab: 0,
            status: String::new(),
            view: DashboardOutcome::Empty(String::new()),
        };
        app.replace_data(txns);
        app
    }

    /// Swap in freshly loaded rows and reset the filters to cover everything
    pub fn replace_data(&mut self, txns: Vec<Transaction>) {
        self.bounds = DateRange::spanning(&txns);
        self.range = self.bounds;
        self.categories = available_categories(&txns);
        self.selected = self.categories.iter().cloned().collect();
        self.cursor = 0;
        self.txns = txns;
        self.recompute();
    }

    pub fn filters(&self) -> Filters {
        let categories = if self.selected.len() == self.categories.len() {
            BTreeSet::new()
        } else {
            self.selected.clone()
        };
        Filters {
            date_range: self.range,
            categories,
        }
    }

    fn recompute(&mut self) {
        self.view = Dashboard::build(&self.txns, &self.filters(), &self.opts);
    }

    pub fn view(&self) -> &DashboardOutcome {
        &self.view
    }

    pub fn tab(&self) -> usize {
        self.tab
    }

    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// One month later or earlier; a month-end date stays on the month end
    fn shift(date: NaiveDate, forward: bool) -> Option<NaiveDate> {
        let month = Month::of(date);
        if date == month.last_day() {
            return if forward {
                Some(month.succ().last_day())
            } else {
                month.first_day().pred_opt()
            };
        }
        if forward {
            date.checked_add_months(Months::new(1))
        } else {
            date.checked_sub_months(Months::new(1))
        }
    }

    /// Move the start of the range by a month, staying within the data and before the end
    fn shift_start(&mut self, forward: bool) {
        let (Some(bounds), Some(mut r)) = (self.bounds, self.range) else { return };
        if let Some(d) = Self::shift(r.start, forward) {
            r.start = d.clamp(bounds.start, r.end);
            self.range = Some(r);
            self.recompute();
        }
    }

    fn shift_end(&mut self, forward: bool) {
        let (Some(bounds), Some(mut r)) = (self.bounds, self.range) else { return };
        if let Some(d) = Self::shift(r.end, forward) {
            r.end = d.clamp(r.start, bounds.end);
            self.range = Some(r);
            self.recompute();
        }
    }

    fn toggle_current(&mut self) {
        let Some(cat) = self.categories.get(self.cursor) else { return };
        if !self.selected.remove(cat) {
            self.selected.insert(cat.clone());
        }
        self.recompute();
    }

    fn toggle_all(&mut self) {
        if self.selected.len() == self.categories.len() {
            self.selected.clear();
        } else {
            self.selected = self.categories.iter().cloned().collect();
        }
        self.recompute();
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Tab | KeyCode::Right => self.tab = (self.tab + 1) % TABS.len(),
            KeyCode::BackTab | KeyCode::Left => self.tab = (self.tab + TABS.len() - 1) % TABS.len(),
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.cursor + 1 < self.categories.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('a') => self.toggle_all(),
            KeyCode::Char('[') => self.shift_start(false),
            KeyCode::Char(']') => self.shift_start(true),
            KeyCode::Char('-') => self.shift_end(false),
            KeyCode::Char('=') | KeyCode::Char('+') => self.shift_end(true),
            _ => {}
        }
        Action::None
    }
}

pub async fn run_dashboard(session: &mut Session, opts: ReportOptions) -> Result<()> {
    let txns = session.transactions().await?;
    let mut app = App::new(session.source.describe(), txns, opts);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = dashboard_loop(&mut terminal, &mut app, session).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn dashboard_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if !event::poll(std::time::Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key.code) {
            Action::Quit => break,
            Action::Reload => match session.reload().await {
                Ok(txns) => {
                    info!(rows = txns.len(), "reloaded");
                    app.replace_data(txns);
                    app.set_status("reloaded");
                }
                Err(e) => {
                    warn!("reload failed: {e:#}");
                    app.set_status(format!("reload failed: {e:#}"));
                }
            },
            Action::None => {}
        }
    }
    Ok(())
}

pub fn draw(f: &mut Frame, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(f.area());

    draw_sidebar(f, app, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    let tabs = Tabs::new(TABS.to_vec())
        .select(app.tab)
        .block(Block::default().borders(Borders::ALL).title(Span::styled(
            "Expenses Explorer",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, rows[0]);

    match &app.view {
        DashboardOutcome::Empty(msg) => {
            let warning = Paragraph::new(msg.as_str())
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(warning, rows[1]);
        }
        DashboardOutcome::Ready(d) => match app.tab {
            0 => draw_overview(f, d, rows[1]),
            1 => draw_categories(f, d, rows[1]),
            2 => draw_distribution(f, d, rows[1]),
            3 => draw_tables(f, d, rows[1]),
            4 => draw_correlations(f, d, rows[1]),
            _ => draw_insights(f, d, rows[1]),
        },
    }

    let mut help = "q quit | tab switch | ↑↓ move | space toggle | a all | [ ] start | - = end | r reload".to_string();
    if !app.status.is_empty() {
        help = format!("{} | {}", app.status, help);
    }
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::Gray)),
        rows[2],
    );
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);

    let range = match app.range {
        Some(r) => vec![
            Line::from(vec![Span::styled("from ", Style::default().fg(Color::Gray)), Span::raw(r.start.to_string())]),
            Line::from(vec![Span::styled("to   ", Style::default().fg(Color::Gray)), Span::raw(r.end.to_string())]),
        ],
        None => vec![Line::raw("(no data)")],
    };
    let mut lines = vec![Line::from(Span::styled(
        "Date range",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(range);
    lines.push(Line::from(Span::styled(
        truncate(&app.source, 26),
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(
        Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL).title("Filters")),
        parts[0],
    );

    let items: Vec<ListItem> = app
        .categories
        .iter()
        .map(|c| {
            let mark = if app.selected.contains(c) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{mark} {c}"))
        })
        .collect();
    let title = if app.selected.is_empty() {
        "Categories (all)".to_string()
    } else {
        format!("Categories ({}/{})", app.selected.len(), app.categories.len())
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(list, parts[1], &mut state);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let tail: String = s.chars().rev().take(max - 1).collect::<Vec<_>>().into_iter().rev().collect();
    format!("…{tail}")
}

fn titled(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).title(title)
}

fn draw_overview(f: &mut Frame, d: &Dashboard, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)])
        .split(area);

    let metrics = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(rows[0]);
    let s = &d.summary;
    for (i, (label, value)) in [
        ("Total Spend", format_currency(s.total_spend)),
        ("Avg Monthly Spend", format_currency(s.avg_monthly_spend)),
        ("Transactions", format_grouped(s.transactions as f64, 0)),
    ]
    .into_iter()
    .enumerate()
    {
        let p = Paragraph::new(Span::styled(value, Style::default().add_modifier(Modifier::BOLD)))
            .alignment(Alignment::Center)
            .block(titled(label));
        f.render_widget(p, metrics[i]);
    }

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    // Monthly trend
    let points: Vec<(f64, f64)> = d
        .monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.spend))
        .collect();
    let max = d.monthly.iter().map(|m| m.spend).fold(0.0, f64::max);
    let x_labels: Vec<String> = match (d.monthly.first(), d.monthly.last()) {
        (Some(a), Some(b)) => vec![a.month.to_string(), b.month.to_string()],
        _ => Vec::new(),
    };
    let dataset = Dataset::default()
        .name("spend")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(titled("Monthly Spend"))
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len().max(2) - 1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, (max * 1.1).max(1.0)])
                .labels(vec![format_currency(0.0), format_currency(max)]),
        );
    f.render_widget(chart, charts[0]);

    // Top categories, horizontal
    let bars: Vec<Bar> = d
        .bar_categories()
        .iter()
        .map(|c| {
            Bar::default()
                .value(c.spend.max(0.0).round() as u64)
                .label(Line::from(c.category.clone()))
                .text_value(format_currency(c.spend))
        })
        .collect();
    let chart = BarChart::default()
        .block(titled("Top Categories by Spend"))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Yellow))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, charts[1]);
}

fn draw_categories(f: &mut Frame, d: &Dashboard, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6)])
        .split(area);

    let legend: Vec<Span> = d
        .stacked
        .categories
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            [
                Span::styled("■ ", Style::default().fg(PALETTE[i % PALETTE.len()])),
                Span::raw(format!("{c}  ")),
            ]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(legend)).block(titled("Top categories")),
        rows[0],
    );

    let groups: Vec<BarGroup> = d
        .stacked
        .rows
        .iter()
        .map(|r| {
            let bars: Vec<Bar> = r
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    Bar::default()
                        .value(v.max(0.0).round() as u64)
                        .text_value(String::new())
                        .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                })
                .collect();
            BarGroup::default()
                .label(Line::from(r.month.to_string()))
                .bars(&bars)
        })
        .collect();

    let mut chart = BarChart::default()
        .block(titled("Monthly Spend by Top Categories"))
        .bar_width(1)
        .bar_gap(0)
        .group_gap(2);
    for g in groups {
        chart = chart.data(g);
    }
    f.render_widget(chart, rows[1]);
}

fn draw_distribution(f: &mut Frame, d: &Dashboard, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let h = &d.histogram;
    let bars: Vec<Bar> = h
        .counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::default()
                .value(*c as u64)
                .label(Line::from(format_currency(h.edges[i])))
        })
        .collect();
    let chart = BarChart::default()
        .block(titled("Distribution of Monthly Spend"))
        .bar_width(8)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Blue))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, cols[0]);

    let header = Row::new(["category", "min", "q1", "median", "q3", "max"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = d
        .ranges
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.category.clone()),
                Cell::from(format_currency(r.min)),
                Cell::from(format_currency(r.q1)),
                Cell::from(format_currency(r.median)),
                Cell::from(format_currency(r.q3)),
                Cell::from(format_currency(r.max)),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(titled("Monthly Spend Range by Top Categories"));
    f.render_widget(table, cols[1]);
}

fn draw_tables(f: &mut Frame, d: &Dashboard, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let header = Row::new(["month_start", "spend", "mom_change", "mom_change_pct"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = d
        .monthly_table
        .iter()
        .map(|r| {
            let change_style = match r.mom_change {
                Some(c) if c > 0.0 => Style::default().fg(Color::Red),
                Some(_) => Style::default().fg(Color::Green),
                None => Style::default(),
            };
            Row::new(vec![
                Cell::from(r.month.first_day().to_string()),
                Cell::from(format_currency(r.spend)),
                Cell::from(r.mom_change.map(format_currency).unwrap_or_default()).style(change_style),
                Cell::from(r.mom_change_pct.map(format_percent).unwrap_or_default())
                    .style(change_style),
            ])
        })
        .collect();
    let monthly = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(15),
        ],
    )
    .header(header)
    .block(titled("Monthly"));
    f.render_widget(monthly, cols[0]);

    let header = Row::new(["category", "spend"]).style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = d
        .table_categories()
        .iter()
        .map(|c| Row::new(vec![c.category.clone(), format_currency(c.spend)]))
        .collect();
    let top = Table::new(rows, [Constraint::Min(12), Constraint::Length(10)])
        .header(header)
        .block(titled("Top Categories"));
    f.render_widget(top, cols[1]);
}

/// Diverging blue-white-red scale for -1..1
pub fn heat_color(r: f64) -> Color {
    let r = r.clamp(-1.0, 1.0);
    let fade = |t: f64| (255.0 * (1.0 - t)).round() as u8;
    if r >= 0.0 {
        Color::Rgb(255, fade(r), fade(r))
    } else {
        Color::Rgb(fade(-r), fade(-r), 255)
    }
}

fn draw_correlations(f: &mut Frame, d: &Dashboard, area: Rect) {
    let Some(c) = &d.correlations else {
        let notice = d.correlation_notice.clone().unwrap_or_default();
        f.render_widget(
            Paragraph::new(notice)
                .wrap(Wrap { trim: true })
                .block(titled("Category Correlations")),
            area,
        );
        return;
    };

    let m = &c.matrix;
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(2)])
        .split(area);

    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(m.categories.iter().map(|cat| Cell::from(cat.clone())));
    let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = m
        .categories
        .iter()
        .enumerate()
        .map(|(i, cat)| {
            let mut cells = vec![Cell::from(cat.clone())];
            cells.extend((0..m.categories.len()).map(|j| match m.heatmap_cell(i, j) {
                Some(v) => Cell::from(format!("{v:>5.2}"))
                    .style(Style::default().fg(Color::Black).bg(heat_color(v))),
                None => Cell::from("").style(Style::default().bg(Color::Black)),
            }));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(16)];
    widths.extend(std::iter::repeat_n(Constraint::Length(10), m.categories.len()));
    let table = Table::new(rows, widths)
        .header(header)
        .block(titled("Monthly Spend Correlation by Category"));
    f.render_widget(table, parts[0]);
    f.render_widget(
        Paragraph::new(c.caption.as_str()).style(Style::default().fg(Color::Gray)),
        parts[1],
    );
}

fn draw_insights(f: &mut Frame, d: &Dashboard, area: Rect) {
    let lines: Vec<Line> = d
        .insights
        .iter()
        .map(|p| Line::from(format!("- {p}")))
        .collect();
    f.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(titled("Insights")),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use spendview_core::TxnType;

    fn t(m: u32, d: u32, cat: &str, s: f64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2025, m, d).unwrap(),
            Some(-s),
            TxnType::Debit,
            cat,
        )
    }

    fn app() -> App {
        let mut txns = Vec::new();
        for m in 1..=5 {
            txns.push(t(m, 2, "rent", 1000.0));
            txns.push(t(m, 26, "dining", 50.0 * m as f64));
            txns.push(t(m, 10, "groceries", 300.0 - 10.0 * m as f64));
        }
        App::new("fixture.csv", txns, ReportOptions::default())
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(150, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_tab_navigation_wraps() {
        let mut a = app();
        assert_eq!(a.handle_key(KeyCode::BackTab), Action::None);
        assert_eq!(a.tab(), TABS.len() - 1);
        a.handle_key(KeyCode::Tab);
        assert_eq!(a.tab(), 0);
        assert_eq!(a.handle_key(KeyCode::Char('q')), Action::Quit);
        assert_eq!(a.handle_key(KeyCode::Char('r')), Action::Reload);
    }

    #[test]
    fn test_category_toggle_refilters() {
        let mut a = app();
        assert!(a.filters().categories.is_empty());

        // cursor starts on "dining"
        a.handle_key(KeyCode::Char(' '));
        let f = a.filters();
        assert_eq!(f.categories.len(), 2);
        assert!(!f.categories.contains("dining"));
        let DashboardOutcome::Ready(d) = a.view() else { panic!("expected data") };
        assert_eq!(d.summary.total_spend, 5000.0 + 1350.0);

        // deselecting everything means no category filter
        a.handle_key(KeyCode::Char('a'));
        a.handle_key(KeyCode::Char('a'));
        assert!(a.filters().categories.is_empty());
    }

    #[test]
    fn test_date_range_shifts_are_clamped() {
        let mut a = app();
        let full = a.range().unwrap();
        a.handle_key(KeyCode::Char('['));
        assert_eq!(a.range().unwrap().start, full.start);

        a.handle_key(KeyCode::Char(']'));
        assert_eq!(a.range().unwrap().start, NaiveDate::from_ymd_opt(2025, 2, 2).unwrap());

        a.handle_key(KeyCode::Char('='));
        assert_eq!(a.range().unwrap().end, full.end);
        a.handle_key(KeyCode::Char('-'));
        assert_eq!(a.range().unwrap().end, NaiveDate::from_ymd_opt(2025, 4, 26).unwrap());

        let DashboardOutcome::Ready(d) = a.view() else { panic!("expected data") };
        assert_eq!(d.summary.months, 3);
    }

    #[test]
    fn test_month_end_shifts_stay_on_month_end() {
        let txns = vec![t(1, 31, "rent", 900.0), t(2, 14, "rent", 900.0), t(3, 31, "rent", 900.0)];
        let mut a = App::new("fixture.csv", txns, ReportOptions::default());

        a.handle_key(KeyCode::Char('-'));
        assert_eq!(a.range().unwrap().end, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        a.handle_key(KeyCode::Char('-'));
        assert_eq!(a.range().unwrap().end, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        a.handle_key(KeyCode::Char('='));
        a.handle_key(KeyCode::Char('='));
        assert_eq!(a.range().unwrap().end, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());

        a.handle_key(KeyCode::Char(']'));
        assert_eq!(a.range().unwrap().start, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_renders_every_tab() {
        let mut a = app();
        let first = screen(&a);
        assert!(first.contains("Expenses Explorer"));
        assert!(first.contains("Total Spend"));
        assert!(first.contains("[x] rent"));

        for expected in [
            "Monthly Spend by Top Categories",
            "Distribution of Monthly Spend",
            "mom_change_pct",
            "Based on 5 months",
            "Date range: 2025-01-02 to 2025-05-26",
        ] {
            a.handle_key(KeyCode::Tab);
            assert!(screen(&a).contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn test_empty_view_shows_warning() {
        let a = App::new("empty.csv", Vec::new(), ReportOptions::default());
        assert!(screen(&a).contains("No data available after filters."));
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(1.0), Color::Rgb(255, 0, 0));
        assert_eq!(heat_color(-1.0), Color::Rgb(0, 0, 255));
        assert_eq!(heat_color(0.0), Color::Rgb(255, 255, 255));
    }
}
