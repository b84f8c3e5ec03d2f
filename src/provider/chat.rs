use anyhow::Result;
use async_trait::async_trait;

use super::{Invocation, PlanTextProvider, JSON_ONLY_SYSTEM_PROMPT};
use crate::llm::{CompletionSettings, LlmClient};

/// Provider backed by an OpenAI-compatible chat completions endpoint.
pub struct ChatProvider {
    name: String,
    client: Option<LlmClient>,
    model: String,
    settings: CompletionSettings,
}

impl ChatProvider {
    pub fn new(
        name: &str,
        http: reqwest::Client,
        api_key: Option<&str>,
        base_url: &str,
        model: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            client: api_key.map(|key| LlmClient::new(http, key, base_url)),
            model: model.to_string(),
            settings: CompletionSettings::default(),
        }
    }
}

#[async_trait]
impl PlanTextProvider for ChatProvider {
    fn name(&self) -> &str {
        &self.name
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
            provider = %self.name,
            model = %self.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "chat completion finished"
        );

        Ok(Invocation::from_text(response.text))
    }
}
