pub mod extract;
pub mod openrouter;
pub mod prompt;
pub mod response;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;

/// Token budgets per kind of request.
pub const SUGGESTION_MAX_TOKENS: u32 = 500;
pub const PLAN_MAX_TOKENS: u32 = 1000;

/// A text-generation backend that answers suggestion prompts.
///
/// Implementations return the raw reply; pulling JSON out of it is the
/// caller's job (see [`extract::extract_json_object`]).
#[async_trait]
pub trait SuggestionService: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}


/// The configured service, or `None` when it is disabled or has no API key.
pub fn create_service(config: &AppConfig) -> Option<Box<dyn SuggestionService>> {
    if !config.llm.enabled {
        return None;
    }
    let api_key = config.llm.resolved_api_key()?;
    Some(Box::new(openrouter::OpenRouterService::new(api_key, &config.llm)))
}
