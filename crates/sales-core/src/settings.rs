use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SalesError};

/// Customer groups that get a per-store product breakdown when none are given.
pub const DEFAULT_FACET_GROUPS: [&str; 3] = ["Whole Foods CO", "Safeway CO", "King Soopers"];

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Sales report generator for grocery distributor exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-report",
    about = "Sales report generator for grocery distributor exports",
    version
)]
pub struct Settings {
    /// Path to the distributor's "Sales and Credits by Store" export
    #[arg(long, default_value = "Data/Sales and Credits by Store.csv")]
    pub input: PathBuf,

    /// Report year
    #[arg(long, default_value = "2024")]
    pub year: i32,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Number of top customers listed per customer group
    #[arg(long, default_value = "5")]
    pub top: usize,

    /// Customer groups below this many lifetime units are left out of the share chart
    #[arg(long, default_value = "1000")]
    pub pie_threshold: u64,

    /// Customer group to break down by store and product (repeatable)
    #[arg(long = "facet-group")]
    pub facet_groups: Vec<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.grocery-sales-report/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
}

impl LastUsedParams {
    /// Default location of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".grocery-sales-report").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments, merge last-used params and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation with explicit args and config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_defaults(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "input") {
            if let Some(v) = last.input {
                settings.input = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "year") {
            if let Some(v) = last.year {
                settings.year = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = last.top {
                settings.top = v;
            }
        }

        settings = Self::resolve_defaults(settings);

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!("Could not persist settings: {}", e);
        }

        settings
    }

    /// Check values clap cannot express as parsers.
    pub fn validate(&self) -> Result<()> {
        if self.top == 0 {
            return Err(SalesError::Config(
                "--top must be at least 1".to_string(),
            ));
        }
        if !(1900..=9999).contains(&self.year) {
            return Err(SalesError::Config(format!(
                "--year {} is not a four-digit year",
                self.year
            )));
        }
        Ok(())
    }

    fn resolve_defaults(mut settings: Settings) -> Settings {
        if settings.facet_groups.is_empty() {
            settings.facet_groups = DEFAULT_FACET_GROUPS.iter().map(|s| s.to_string()).collect();
        }
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            input: Some(s.input.clone()),
            year: Some(s.year),
            format: Some(s.format.clone()),
            top: Some(s.top),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
