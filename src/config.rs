use crate::{
    models::DepositionId,
    services::publisher::{AuthToken, PublishRequest, zenodo_base_url},
};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub deposition_id: DepositionId,
    pub file: PathBuf,
    pub version: String,
    pub token: AuthToken,
    pub sandbox: bool,
    pub base_url_override: Option<String>,
    pub timeout: Duration,
    pub verify_checksum: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Publish a new version of a Zenodo deposition"
)]
pub struct Args {
    /// Identifier of the deposition to create a new version of
    pub deposition_id: DepositionId,

    /// File to upload into the new version
    pub file: PathBuf,

    /// Version to record on the new version (defaults to today's date, YYYY-MM-DD)
    #[arg(value_name = "VERSION")]
    pub new_version: Option<String>,

    /// Zenodo access token (overrides ZENODO_ACCESS_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Use sandbox.zenodo.org (overrides ZENODO_SANDBOX)
    #[arg(long)]
    pub sandbox: bool,

    /// API base URL, replaces the production/sandbox choice (overrides ZENODO_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (overrides ZENODO_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Compare the uploaded file's checksum with a locally computed MD5
    #[arg(long)]
    pub verify_checksum: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();
        Self::from_parts(args, |key| env_value(key, env::var(key)))
    }

    /// Merge parsed arguments with values found through `lookup`. CLI wins.
    pub fn from_parts(args: Args, lookup: impl Fn(&str) -> Result<Option<String>>) -> Result<Self> {
        // --- Environment fallback ---
        let env_token = lookup("ZENODO_ACCESS_TOKEN")?;
        let env_sandbox = match lookup("ZENODO_SANDBOX")? {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("parsing ZENODO_SANDBOX value `{}`", value))?,
            None => false,
        };
        let env_timeout = match lookup("ZENODO_TIMEOUT_SECS")? {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("parsing ZENODO_TIMEOUT_SECS value `{}`", value))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let env_base_url = lookup("ZENODO_BASE_URL")?;

        // --- Merge ---
        let Some(token) = args.token.or(env_token).filter(|t| !t.is_empty()) else {
            bail!("missing access token: pass --token or set ZENODO_ACCESS_TOKEN");
        };

        Ok(Self {
            deposition_id: args.deposition_id,
            file: args.file,
            version: args.new_version.unwrap_or_else(today),
            token: AuthToken::new(token),
            sandbox: args.sandbox || env_sandbox,
            base_url_override: args.base_url.or(env_base_url),
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(env_timeout)),
            verify_checksum: args.verify_checksum,
        })
    }

    /// The override when given, otherwise sandbox or production.
    pub fn base_url(&self) -> String {
        match &self.base_url_override {
            Some(url) => url.clone(),
            None => zenodo_base_url(self.sandbox).to_string(),
        }
    }

    pub fn publish_request(&self) -> PublishRequest {
        PublishRequest::new(
            self.deposition_id.clone(),
            self.file.clone(),
            self.version.clone(),
        )
        .verify_checksum(self.verify_checksum)
    }
}

/// A set variable, `None` when unset, an error when it is not valid Unicode.
fn env_value(key: &str, value: Result<String, env::VarError>) -> Result<Option<String>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got `{}`", other),
    }
}
