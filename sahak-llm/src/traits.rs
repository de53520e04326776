use async_trait::async_trait;
use sahak_common::{Result, SahakError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    pub finish_reason: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid API key")]
    Unauthorized,

    #[error("API access forbidden")]
    Forbidden,

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Content blocked by safety filters")]
    Blocked,

    #[error("Empty reply: {0}")]
    Empty(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<LlmError> for SahakError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Config(msg) => SahakError::Config(msg),
            other => SahakError::Llm(other.to_string()),
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Single prompt, provider defaults, text only.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.generate(prompt, None, None, None).await?;
        tracing::debug!(
            model = self.model_name(),
            tokens_used = ?response.tokens_used,
            "llm.complete"
        );
        Ok(response.text)
    }
}
