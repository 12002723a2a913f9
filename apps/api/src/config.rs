use anyhow::{Context, Result};

use crate::pipeline::stages::{Registries, StageRegistry};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub crm_api_url: String,
    pub crm_api_token: Option<String>,
    pub crm_api_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    /// Idle drag sessions are dropped after this many seconds.
    pub drag_session_ttl_secs: u64,
    /// Deployment-time stage overrides, `id:Name:#color,...`.
    pub deal_stages: Option<String>,
    pub job_stages: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            crm_api_url: require_env("CRM_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            crm_api_token: optional_env("CRM_API_TOKEN"),
            crm_api_timeout_secs: std::env::var("CRM_API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("CRM_API_TIMEOUT_SECS must be a whole number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            drag_session_ttl_secs: std::env::var("DRAG_SESSION_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse::<u64>()
                .context("DRAG_SESSION_TTL_SECS must be a whole number of seconds")?,
            deal_stages: optional_env("DEAL_STAGES"),
            job_stages: optional_env("JOB_STAGES"),
        })
    }

    /// Builds the stage registries for both boards, applying any overrides.
    pub fn registries(&self) -> Result<Registries> {
        let deals = match &self.deal_stages {
            Some(raw) => StageRegistry::parse(raw).context("DEAL_STAGES is malformed")?,
            None => StageRegistry::default_deals(),
        };
        let jobs = match &self.job_stages {
            Some(raw) => StageRegistry::parse(raw).context("JOB_STAGES is malformed")?,
            None => StageRegistry::default_jobs(),
        };
        Ok(Registries { deals, jobs })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
