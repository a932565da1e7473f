use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::cli::Cli;
use crate::registry::maven::{RepositoryConfig, DEFAULT_TIMEOUT};
use crate::report::csv::CsvSettings;

/// Root configuration structure, deserialized from `.pom-inventory/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote repository used for enrichment.
    pub repository: RepositorySection,
    /// CSV output settings.
    pub report: ReportSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RepositorySection {
    /// Redirect service URI. Absent or blank disables enrichment.
    pub uri: Option<String>,
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
    /// Set from `--offline`; never read from the file.
    #[serde(skip)]
    pub offline: bool,
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            uri: None,
            name: "central-proxy".to_string(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            offline: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Dependencies in this group are reported as internal.
    pub internal_group_id: String,
    pub separator: String,
    pub prefix: String,
    pub output_dir: PathBuf,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            internal_group_id: String::new(),
            separator: "\t".to_string(),
            prefix: String::new(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Apply command line flags on top of the file values, field by field.
    pub fn merge_cli(&mut self, cli: &Cli) {
        let repo = &mut self.repository;
        if let Some(uri) = &cli.maven_uri {
            repo.uri = Some(uri.clone());
        }
        if let Some(name) = &cli.maven_repository {
            repo.name = name.clone();
        }
        if let Some(user) = &cli.maven_user {
            repo.username = Some(user.clone());
        }
        if let Some(password) = &cli.maven_password {
            repo.password = Some(password.clone());
        }
        repo.offline |= cli.offline;

        let report = &mut self.report;
        if let Some(group_id) = &cli.group_id {
            report.internal_group_id = group_id.clone();
        }
        if let Some(separator) = &cli.separator {
            report.separator = separator.clone();
        }
        if let Some(prefix) = &cli.prefix {
            report.prefix = prefix.clone();
        }
        if let Some(dir) = &cli.result_dir {
            report.output_dir = dir.clone();
        }
    }

    /// Connection settings for enrichment, or `None` when it is disabled.
    pub fn repository_config(&self) -> Option<RepositoryConfig> {
        let repo = &self.repository;
        if repo.offline {
            return None;
        }
        let uri = repo.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(RepositoryConfig {
            uri: uri.to_string(),
            repository: repo.name.clone(),
            username: repo.username.clone(),
            password: repo.password.clone(),
            timeout: Duration::from_secs(repo.timeout_secs),
        })
    }

    pub fn csv_settings(&self) -> Result<CsvSettings> {
        Ok(CsvSettings {
            output_dir: self.report.output_dir.clone(),
            prefix: self.report.prefix.clone(),
            delimiter: self.report.delimiter()?,
        })
    }
}

impl ReportSection {
    /// The separator as a CSV delimiter byte. Only a single ASCII character is accepted.
    pub fn delimiter(&self) -> Result<u8> {
        match self.separator.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => bail!(
                "separator must be a single ASCII character, got {:?}",
                self.separator
            ),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<root>/.pom-inventory/config.toml`
/// 3. `~/.config/pom-inventory/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(root: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = root.join(".pom-inventory").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("pom-inventory")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}
