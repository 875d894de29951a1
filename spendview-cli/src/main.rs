use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use spendview_finance::clean::parse_date;
use spendview_finance::dashboard::NO_DATA_AFTER_CLEANING;
use spendview_finance::{Dashboard, DashboardOutcome, DateRange, Filters};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, SourceOverride};
use crate::session::Session;

mod config;
mod report;
mod session;
mod state;
mod tui;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SPENDVIEW_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "spendview",
    version = VERSION,
    long_version = VERSION,
    about = "Personal spending dashboard over a CSV export or a Google Sheet"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct SourceArgs {
    /// Read transactions from this CSV file
    #[arg(long, conflicts_with = "sheets")]
    csv: Option<PathBuf>,

    /// Read transactions from the configured Google Sheet
    #[arg(long)]
    sheets: bool,
}

impl From<SourceArgs> for SourceOverride {
    fn from(a: SourceArgs) -> Self {
        SourceOverride {
            csv: a.csv,
            sheets: a.sheets,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full dashboard once
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// First day to include (defaults to the earliest transaction)
        #[arg(long)]
        from: Option<String>,

        /// Last day to include (defaults to the latest transaction)
        #[arg(long)]
        to: Option<String>,

        /// Only include this category (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Interactive terminal dashboard
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Check that the Google Sheet can be read
    SheetsCheck,

    /// Manage ~/.spendview/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let to_file = matches!(cli.command, Command::Dashboard { .. });
    init_logging(cli.verbose, to_file)?;

    match cli.command {
        Command::Report {
            source,
            from,
            to,
            categories,
            format,
        } => {
            let cfg = config::load_config()?;
            let data_source = cfg.data_source(&source.into())?;
            let mut session = Session::new(data_source, cfg.cleaning.clone());
            let txns = session.transactions().await?;
            if txns.is_empty() {
                println!("{NO_DATA_AFTER_CLEANING}");
                return Ok(());
            }

            let filters = report_filters(&txns, from.as_deref(), to.as_deref(), categories)?;
            debug!(?filters, "report filters");
            match Dashboard::build(&txns, &filters, &cfg.report) {
                DashboardOutcome::Empty(msg) => println!("{msg}"),
                DashboardOutcome::Ready(d) => match format {
                    Format::Text => {
                        let text = report::render_text(&d, &session.source.describe())
                            .context("render report")?;
                        print!("{text}");
                    }
                    Format::Json => {
                        let json = serde_json::to_string_pretty(&d).context("serialize report")?;
                        println!("{json}");
                    }
                },
            }
        }

        Command::Dashboard { source } => {
            let cfg = config::load_config()?;
            let data_source = cfg.data_source(&source.into())?;
            let mut session = Session::new(data_source, cfg.cleaning.clone());
            tui::run_dashboard(&mut session, cfg.report.clone()).await?;
        }

        Command::SheetsCheck => sheets_check().await?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` picks the level. Dashboard mode logs to a file.
fn init_logging(verbose: u8, to_file: bool) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    if to_file {
        let path = state::log_path()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .map_err(|e| anyhow!("init logging: {e}"))
    } else {
        builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("init logging: {e}"))
    }
}

fn parse_day(flag: &str, raw: &str) -> Result<NaiveDate> {
    parse_date(raw).with_context(|| format!("{flag}: unrecognized date '{raw}' (try YYYY-MM-DD)"))
}

/// Build filters from `--from/--to/--category`; open ends fall back to the data bounds.
fn report_filters(
    txns: &[spendview_core::Transaction],
    from: Option<&str>,
    to: Option<&str>,
    categories: Vec<String>,
) -> Result<Filters> {
    let date_range = match (from, to) {
        (None, None) => None,
        (from, to) => {
            let Some(bounds) = DateRange::spanning(txns) else {
                return Ok(Filters::default());
            };
            let start = from.map(|s| parse_day("--from", s)).transpose()?.unwrap_or(bounds.start);
            let end = to.map(|s| parse_day("--to", s)).transpose()?.unwrap_or(bounds.end);
            if start > end {
                bail!("--from {start} is after --to {end}");
            }
            Some(DateRange::new(start, end))
        }
    };

    Ok(Filters {
        date_range,
        categories: categories
            .iter()
            .map(|c| spendview_finance::clean::normalize_category(c))
            .collect(),
    })
}

async fn sheets_check() -> Result<()> {
    let cfg: Config = config::load_config()?;
    let source = cfg.data_source(&SourceOverride {
        csv: None,
        sheets: true,
    })?;
    info!(source = %source.describe(), "checking sheet access");

    let table = source.load().await?;
    println!("Connected to {}", source.describe());
    println!("Rows: {}", table.len());
    let headers: Vec<&str> = table.headers.iter().take(5).map(String::as_str).collect();
    println!("Headers: {}", headers.join(", "));
    match table.rows.first() {
        Some(row) => {
            let cells: Vec<&str> = row.iter().take(5).map(String::as_str).collect();
            println!("First row: {}", cells.join(", "));
        }
        None => println!("First row: (none)"),
    }
    Ok(())
}
