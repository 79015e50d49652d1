//! Operator configuration: `~/.config/bidrunner2/config.toml`.
//!
//! A missing file is created as a blank template and reported as an error
//! telling the operator to fill it in; nothing is prompted interactively.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bidrunner_engine::{AwsCredentials, RunnerConfig};
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "bidrunner2";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub aws: AwsSection,
    #[serde(default)]
    pub job: JobSection,
}

/// Credentials and queue endpoint; all of these must be filled in before
/// anything can be launched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AwsSection {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    #[serde(default)]
    pub aws_session_token: Option<String>,
    pub queue_url: String,
    #[serde(default)]
    pub region: Option<String>,
}

/// Optional overrides for the deployment defaults (cluster, task
/// definition, network placement). Absent fields keep the built-in values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobSection {
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub task_definition_family: Option<String>,
    #[serde(default)]
    pub task_definition_revision: Option<String>,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub subnets: Option<Vec<String>>,
    #[serde(default)]
    pub assign_public_ip: Option<bool>,
}

impl AppConfig {
    /// Split into the engine's typed configuration, validated once here so
    /// a bad config fails at startup rather than deep inside a request.
    pub fn into_engine(self) -> Result<(RunnerConfig, AwsCredentials)> {
        if self.aws.aws_access_key_id.trim().is_empty()
            || self.aws.aws_secret_access_key.trim().is_empty()
        {
            bail!(
                "aws credentials are blank; edit {} and fill in the [aws] section",
                default_path().display()
            );
        }
        let credentials = AwsCredentials::new(
            self.aws.aws_access_key_id,
            self.aws.aws_secret_access_key,
            self.aws.aws_session_token,
        );

        let mut config = RunnerConfig {
            queue_url: self.aws.queue_url,
            ..RunnerConfig::default()
        };
        if let Some(region) = self.aws.region {
            config.region = region;
        }
        if let Some(cluster) = self.job.cluster {
            config.cluster = cluster;
        }
        if let Some(family) = self.job.task_definition_family {
            config.task_definition_family = family;
        }
        if let Some(revision) = self.job.task_definition_revision {
            config.task_definition_revision = revision;
        }
        if let Some(container) = self.job.container_name {
            config.container_name = container;
        }
        if let Some(subnets) = self.job.subnets {
            config.subnets = subnets;
        }
        if let Some(assign) = self.job.assign_public_ip {
            config.assign_public_ip = assign;
        }
        config
            .validate()
            .with_context(|| format!("bad configuration in {}", default_path().display()))?;

        Ok((config, credentials))
    }
}

/// Platform config location: `~/.config/bidrunner2/config.toml` on Linux,
/// `%APPDATA%\bidrunner2\config.toml` on Windows.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a blank template the operator can fill in.
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    let template = toml::to_string_pretty(&AppConfig::default())
        .context("could not render the config template")?;
    fs::write(path, template).with_context(|| format!("could not write {}", path.display()))?;
    Ok(())
}

/// Load the config file at `path`, bootstrapping a template when missing.
pub fn load(path: &Path) -> Result<AppConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            write_template(path)?;
            bail!(
                "created a blank config file; fill in the values and retry:\n  {}",
                path.display()
            );
        }
        Err(err) => {
            return Err(err).with_context(|| format!("could not read {}", path.display()));
        }
    };
    toml::from_str(&contents).with_context(|| format!("could not parse {}", path.display()))
}
