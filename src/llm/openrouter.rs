use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::SuggestionService;
use crate::config::LlmConfig;

/// OpenAI-style chat completion client, pointed at OpenRouter by default.
pub struct OpenRouterService {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    site_url: Option<String>,
    site_name: Option<String>,
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new(api_key: String, config: &LlmConfig) -> Self {
        Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            site_url: config.site_url.clone(),
            site_name: config.site_name.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[async_trait]
impl SuggestionService for OpenRouterService {
    fn name(&self) -> &str {
        "OpenRouter"
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": max_tokens,
        });

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json");
        if let Some(url) = &self.site_url {
            req = req.header("HTTP-Referer", url);
        }
        if let Some(name) = &self.site_name {
            req = req.header("X-Title", name);
        }

        let resp = req
            .json(&body)
            .send()
            .await
            .context("OpenRouter API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenRouter returned {status}: {text}");
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse OpenRouter response")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .context("No content in OpenRouter response")?;

        Ok(content)
    }
}
