use crate::cli::Cli;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "codex.toml";
pub const DEFAULT_ARCHIVE_PATH: &str = "archive.cdx";
pub const DEFAULT_LEDGER_PATH: &str = "veritas_chain.json";

/// `codex.toml` as written on disk; every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialConfig {
    archive_path: Option<PathBuf>,
    ledger_path: Option<PathBuf>,
    user: Option<String>,
    record_events: Option<bool>,
}

/// Fully resolved settings used by the commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub archive_path: PathBuf,
    pub ledger_path: PathBuf,
    pub user: String,
    pub record_events: bool,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::parse(&contents)
            .map_err(|e| CliError::Config(format!("Invalid config file '{}': {}", path.display(), e)))
    }

    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply command-line overrides on top of the file, then defaults.
    pub fn merge_with_cli(self, cli: &Cli) -> Config {
        Config {
            archive_path: cli
                .archive
                .clone()
                .or(self.archive_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_PATH)),
            ledger_path: cli
                .ledger
                .clone()
                .or(self.ledger_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
            user: cli
                .user
                .clone()
                .or(self.user)
                .unwrap_or_else(default_user),
            record_events: self.record_events.unwrap_or(true),
        }
    }
}

fn default_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "keeper".to_string())
}

/// Resolve the configuration for this invocation.
///
/// An explicit `--config` must exist; the implicit `./codex.toml` is
/// optional.
pub fn resolve(cli: &Cli) -> Result<Config> {
    let partial = match &cli.config {
        Some(path) => PartialConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            PartialConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => PartialConfig::default(),
    };
    let config = partial.merge_with_cli(cli);
    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}
