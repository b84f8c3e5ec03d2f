use anyhow::Result;
use async_trait::async_trait;

use super::{Invocation, PlanTextProvider, JSON_ONLY_SYSTEM_PROMPT};
use crate::llm::{AnthropicClient, CompletionSettings};

pub struct AnthropicProvider {
    client: Option<AnthropicClient>,
    model: String,
    settings: CompletionSettings,
}

impl AnthropicProvider {
    pub fn new(http: reqwest::Client, api_key: Option<&str>, model: &str) -> Self {
        Self {
            client: api_key.map(|key| AnthropicClient::new(http, key)),
            model: model.to_string(),
            settings: CompletionSettings::default(),
        }
    }
}

#[async_trait]
impl PlanTextProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn invoke(&self, prompt: &str) -> Result<Invocation> {
        let Some(client) = &self.client else {
            return Ok(Invocation::Unavailable);
        };

        let response = client
            .complete(
                &self.model,
                Some(JSON_ONLY_SYSTEM_PROMPT),
                prompt,
                &self.settings,
            )
            .await?;

        tracing::debug!(
            model = %self.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "anthropic completion finished"
        );

        Ok(Invocation::from_text(response.text))
    }
}
