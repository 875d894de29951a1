use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use spendview_finance::{CleanOptions, ReportOptions};
use spendview_ingest::{DataSource, SheetSpec};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::spendview_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub cleaning: CleanOptions,
    #[serde(default)]
    pub report: ReportOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Sheets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub kind: SourceKind,
    pub csv_path: PathBuf,
    /// Google spreadsheet key (for kind = "sheets")
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    pub range: String,
    /// Service-account key file; GOOGLE_CREDENTIALS_JSON takes precedence
    pub credentials_file: Option<PathBuf>,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            kind: SourceKind::Csv,
            csv_path: PathBuf::from("expenses.csv"),
            spreadsheet_id: None,
            sheet_name: spendview_ingest::sheets::default_sheet_name(),
            range: spendview_ingest::sheets::default_range(),
            credentials_file: Some(PathBuf::from("credentials/service-account.json")),
        }
    }
}

/// Source choice from the command line
#[derive(Debug, Clone, Default)]
pub struct SourceOverride {
    pub csv: Option<PathBuf>,
    pub sheets: bool,
}

impl Config {
    /// Resolve the data source; command-line flags win over the config file.
    pub fn data_source(&self, over: &SourceOverride) -> Result<DataSource> {
        if let Some(path) = &over.csv {
            return Ok(DataSource::Csv { path: path.clone() });
        }
        let kind = if over.sheets {
            SourceKind::Sheets
        } else {
            self.source.kind
        };
        match kind {
            SourceKind::Csv => Ok(DataSource::Csv {
                path: self.source.csv_path.clone(),
            }),
            SourceKind::Sheets => {
                let Some(id) = self.source.spreadsheet_id.clone() else {
                    bail!("source.spreadsheet_id is not set (edit {})", config_path_display());
                };
                Ok(DataSource::Sheets {
                    spec: SheetSpec {
                        spreadsheet_id: id,
                        sheet_name: self.source.sheet_name.clone(),
                        range: self.source.range.clone(),
                    },
                    credentials_file: self.source.credentials_file.clone(),
                })
            }
        }
    }

    /// Reject values the report cannot be built with
    pub fn validate(&self) -> Result<()> {
        let bin = self.report.histogram_bin;
        if !(bin.is_finite() && bin > 0.0) {
            bail!("report.histogram_bin must be a positive number, got {bin}");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(spendview_home()?.join("config.toml"))
}

fn config_path_display() -> String {
    config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "~/.spendview/config.toml".to_string())
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.validate().with_context(|| format!("invalid {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    if let Some(dir) = p.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
