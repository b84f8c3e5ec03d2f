use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{CompletionSettings, LlmResponse};

/// Client for OpenAI-compatible chat completion endpoints (OpenAI, Groq).
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl LlmClient {
    pub fn new(client: reqwest::Client, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
        }
    }

    pub async fn complete(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        user_message: &str,
        settings: &CompletionSettings,
    ) -> Result<LlmResponse> {
        let request = build_request(model, system_prompt, user_message, settings);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to chat completions API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completions API error ({}): {}", status, body);
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse chat completions API response")?;

        Ok(into_llm_response(api_response))
    }
}

fn build_request(
    model: &str,
    system_prompt: Option<&str>,
    user_message: &str,
    settings: &CompletionSettings,
) -> ChatCompletionRequest {
    let mut messages = Vec::new();
    if let Some(system) = system_prompt {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: user_message.to_string(),
    });

    ChatCompletionRequest {
        model: model.to_string(),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
        messages,
    }
}

fn into_llm_response(api_response: ChatCompletionResponse) -> LlmResponse {
    let text = api_response
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .unwrap_or("")
        .trim()
        .to_string();

    let (input_tokens, output_tokens) = api_response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    LlmResponse {
        text,
        input_tokens,
        output_tokens,
    }
}
