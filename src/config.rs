use crate::error::LoggerError;
use crate::normalizer::ExtractionStrategy;
use crate::types::Committer;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "./config.toml";

#[derive(Parser, Debug, Default)]
#[clap(name = "ip-logbook", version, about)]
pub struct Cli {
    /// Path to configuration file (defaults to ./config.toml when present)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Override listen address
    #[clap(long)]
    pub listen: Option<String>,

    /// GitHub token used for the contents API
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository owner
    #[clap(long, env = "REPO_OWNER")]
    pub owner: Option<String>,

    /// Repository name
    #[clap(long, env = "REPO_NAME")]
    pub repo: Option<String>,

    /// How the visitor address is extracted from requests
    #[clap(long, value_enum)]
    pub strategy: Option<ExtractionStrategy>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub api_root: String,
    pub github_token: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub file_path: String,
    pub strategy: ExtractionStrategy,
    pub commit_message: String,
    pub committer_name: String,
    pub committer_email: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8888".to_string(),
            api_root: "https://api.github.com".to_string(),
            github_token: String::new(),
            repo_owner: String::new(),
            repo_name: String::new(),
            file_path: "ip_log.txt".to_string(),
            strategy: ExtractionStrategy::Auto,
            commit_message: "Log visitor IP".to_string(),
            committer_name: "IP Logger Bot".to_string(),
            committer_email: "bot@example.com".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn committer(&self) -> Committer {
        Committer {
            name: self.committer_name.clone(),
            email: self.committer_email.clone(),
        }
    }

    /// Layers CLI flags and their environment fallbacks over file values.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(ref listen) = cli.listen {
            self.listen_addr = listen.clone();
        }

        if let Some(ref token) = cli.token {
            self.github_token = token.clone();
        }

        if let Some(ref owner) = cli.owner {
            self.repo_owner = owner.clone();
        }

        if let Some(ref repo) = cli.repo {
            self.repo_name = repo.clone();
        }

        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        let required = [
            ("github_token", &self.github_token),
            ("repo_owner", &self.repo_owner),
            ("repo_name", &self.repo_name),
            ("file_path", &self.file_path),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(LoggerError::ConfigError(format!("{} is not set", name)));
            }
        }

        Ok(())
    }
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let path = match cli.config {
        Some(ref path) => Some(path.clone()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            default.exists().then_some(default)
        }
    };

    let mut config = match path {
        Some(path) => {
            let config_content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&config_content).context("Failed to parse config file")?
        }
        None => Config::default(),
    };

    config.apply_overrides(cli);
    config.validate()?;

    Ok(config)
}
