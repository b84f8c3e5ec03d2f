use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::provider::ProviderKind;

#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub groq_model: String,
    pub openai_model: String,
    pub anthropic_model: String,
    pub groq_base_url: String,
    pub openai_base_url: String,
    pub provider_order: Vec<ProviderKind>,
    pub provider_timeout: Duration,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());
        // an exported-but-empty key counts as missing
        let secret = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            groq_api_key: secret("GROQ_API_KEY"),
            openai_api_key: secret("OPENAI_API_KEY"),
            anthropic_api_key: secret("ANTHROPIC_API_KEY"),
            groq_model: var("GROQ_MODEL", "llama-3.3-70b-versatile"),
            openai_model: var("OPENAI_MODEL", "gpt-4o-mini"),
            anthropic_model: var("ANTHROPIC_MODEL", "claude-3-5-haiku-latest"),
            groq_base_url: var(
                "GROQ_BASE_URL",
                "https://api.groq.com/openai/v1/chat/completions",
            ),
            openai_base_url: var(
                "OPENAI_BASE_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            provider_order: parse_provider_order(&var("PROVIDER_ORDER", "groq,openai,anthropic"))?,
            provider_timeout: Duration::from_secs(
                var("PROVIDER_TIMEOUT_SECS", "60")
                    .parse()
                    .context("PROVIDER_TIMEOUT_SECS must be a number")?,
            ),
            data_dir: PathBuf::from(var("DATA_DIR", "data")),
            log_dir: PathBuf::from(var("LOG_DIR", "logs")),
        })
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }

    pub fn plans_path(&self) -> PathBuf {
        self.data_dir.join("plans.json")
    }
}

fn parse_provider_order(raw: &str) -> Result<Vec<ProviderKind>> {
    let mut order = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let kind: ProviderKind = name
            .parse()
            .with_context(|| format!("PROVIDER_ORDER contains unknown provider {name:?}"))?;
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    Ok(order)
}
