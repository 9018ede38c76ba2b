//! Application settings.
//!
//! Precedence, lowest first: built-in defaults, an optional JSON file,
//! `GRIDBASE_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cli::CliArgs;
use crate::error::{GridError, GridResult};
use crate::io::TableTemplate;

pub const ENV_PREFIX: &str = "GRIDBASE_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: Option<PathBuf>,
    pub owner: String,
    pub table: Option<String>,
    pub row_limit: usize,
    pub row_height: f64,
    pub overscan: usize,
    pub column_width: f64,
    pub index_column_width: f64,
    pub seed_rows: usize,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            owner: "local".to_string(),
            table: None,
            row_limit: 50,
            row_height: 32.0,
            overscan: 10,
            column_width: 180.0,
            index_column_width: 56.0,
            seed_rows: 3,
            log_filter: "warn".to_string(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> GridResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GridError::Validation(format!("{name} has an invalid value: {value:?}")))
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults, then the `--config` file if given, then the process environment, then `cli`.
    pub fn load(cli: &CliArgs) -> GridResult<Self> {
        let mut config = match cli.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> GridResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Applies recognised `GRIDBASE_*` variables; others are ignored.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> GridResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match name {
                "DB" => self.database_path = Some(PathBuf::from(value)),
                "OWNER" => self.owner = value.to_string(),
                "TABLE" => self.table = Some(value.to_string()),
                "ROW_LIMIT" => self.row_limit = parse_env(key, value)?,
                "ROW_HEIGHT" => self.row_height = parse_env(key, value)?,
                "OVERSCAN" => self.overscan = parse_env(key, value)?,
                "SEED_ROWS" => self.seed_rows = parse_env(key, value)?,
                "LOG" => self.log_filter = value.to_string(),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &CliArgs) {
        if let Some(db) = &cli.db {
            self.database_path = Some(db.clone());
        }
        if let Some(owner) = &cli.owner {
            self.owner = owner.clone();
        }
        if let Some(table) = &cli.table {
            self.table = Some(table.clone());
        }
        if let Some(row_limit) = cli.row_limit {
            self.row_limit = row_limit;
        }
    }

    pub fn validate(&self) -> GridResult<()> {
        if self.owner.trim().is_empty() {
            return Err(GridError::Validation("owner must not be blank".to_string()));
        }
        if self.row_limit == 0 {
            return Err(GridError::Validation("row_limit must be at least 1".to_string()));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(GridError::Validation("row_height must be positive".to_string()));
        }
        if !(self.column_width.is_finite() && self.column_width > 0.0)
            || !(self.index_column_width.is_finite() && self.index_column_width > 0.0)
        {
            return Err(GridError::Validation(
                "column widths must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolved_database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => path.clone(),
            None => default_database_path(),
        }
    }

    pub fn table_template(&self) -> TableTemplate {
        TableTemplate::with_seed_rows(self.seed_rows)
    }
}

/// `<data dir>/gridbase/gridbase.db`, falling back to the working directory.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridbase")
        .join("gridbase.db")
}

/// The subset of settings the grid view needs at runtime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSettings {
    pub row_limit: usize,
    pub row_height: f64,
    pub overscan: usize,
    pub column_width: f64,
    pub index_column_width: f64,
}

impl From<&AppConfig> for GridSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            row_limit: config.row_limit,
            row_height: config.row_height,
            overscan: config.overscan,
            column_width: config.column_width,
            index_column_width: config.index_column_width,
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}
