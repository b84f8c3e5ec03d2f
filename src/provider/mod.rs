//! Plan-text providers: the LLM backends the pipeline can ask for a plan.
//!
//! Each provider either returns the model's raw text, reports that it
//! returned nothing, or reports that it is not configured at all. A failed
//! call is an `Err`; the pipeline decides what to do with it.

pub mod anthropic;
pub mod chat;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

use crate::config::Config;

pub use anthropic::AnthropicProvider;
pub use chat::ChatProvider;

/// System message sent alongside every plan prompt.
pub const JSON_ONLY_SYSTEM_PROMPT: &str = "You output strict minified JSON only.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The provider answered with non-empty text.
    Text(String),
    /// The provider answered, but with no content.
    Empty,
    /// The provider is not configured (e.g. no credential); nothing was sent.
    Unavailable,
}

impl Invocation {
    /// Wrap a provider reply, mapping whitespace-only text to `Empty`.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Invocation::Empty
        } else {
            Invocation::Text(text)
        }
    }
}

#[async_trait]
pub trait PlanTextProvider: Send + Sync {
    /// Stable name used in logs and attempt records (e.g. "groq").
    fn name(&self) -> &str;

    async fn invoke(&self, prompt: &str) -> Result<Invocation>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn PlanTextProvider) {}
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Groq,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(String);

impl std::str::FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(ProviderKind::Groq),
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Build the providers named in `config.provider_order`, in that order.
/// Providers without a credential are still built; they report
/// [`Invocation::Unavailable`] when asked.
pub fn from_config(config: &Config) -> Vec<Box<dyn PlanTextProvider>> {
    let http = reqwest::Client::new();

    config
        .provider_order
        .iter()
        .map(|kind| -> Box<dyn PlanTextProvider> {
            match kind {
                ProviderKind::Groq => Box::new(ChatProvider::new(
                    "groq",
                    http.clone(),
                    config.groq_api_key.as_deref(),
                    &config.groq_base_url,
                    &config.groq_model,
                )),
                ProviderKind::OpenAi => Box::new(ChatProvider::new(
                    "openai",
                    http.clone(),
                    config.openai_api_key.as_deref(),
                    &config.openai_base_url,
                    &config.openai_model,
                )),
                ProviderKind::Anthropic => Box::new(AnthropicProvider::new(
                    http.clone(),
                    config.anthropic_api_key.as_deref(),
                    &config.anthropic_model,
                )),
            }
        })
        .collect()
}
