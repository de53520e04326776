use crate::traits::{LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use sahak_common::Result;
use sahak_http::{header_auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_settings: Option<Vec<GeminiSafetySetting>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

/// Google Gemini `generateContent` client.
///
/// Requires a valid API key and internet access. The key travels in the
/// `x-goog-api-key` header and is redacted from every log line.
pub struct GeminiClient {
    client: HttpClient,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl GeminiClient {
    /// Create a new client using the provided API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(GEMINI_BASE_URL, api_key, model)
    }

    /// Point the client at a different endpoint (gateways, test servers).
    pub fn with_base_url(base_url: &str, api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("Gemini API key is empty".to_string()).into());
        }
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let client = HttpClient::new(&base)
            .map_err(|e| LlmError::Config(format!("HttpClient init failed: {e}")))?
            .with_timeout(Duration::from_secs(120));

        Ok(Self {
            client,
            api_key,
            model,
            temperature: None,
            max_tokens: None,
        })
    }

    /// Override the per-call timeout (default 120 s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Sampling defaults used when a call does not set its own.
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn create_safety_settings() -> Vec<GeminiSafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| GeminiSafetySetting {
            category,
            threshold: "BLOCK_MEDIUM_AND_ABOVE",
        })
        .collect()
    }
}

fn http_to_llm(e: HttpError) -> LlmError {
    match e.status().map(|s| s.as_u16()) {
        Some(429) => LlmError::RateLimit,
        Some(401) => LlmError::Unauthorized,
        Some(403) => LlmError::Forbidden,
        Some(_) => LlmError::Api(e.to_string()),
        None => match e {
            HttpError::Decode(msg, _) => LlmError::Api(format!("Failed to parse Gemini response: {msg}")),
            other => LlmError::Network(other.to_string()),
        },
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let path = format!("models/{}:generateContent", self.model);
        let max_tokens = max_tokens.or(self.max_tokens);
        let temperature = temperature.or(self.temperature);

        let generation_config = if max_tokens.is_some() || temperature.is_some() {
            Some(GeminiGenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
            })
        } else {
            None
        };

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
            safety_settings: Some(Self::create_safety_settings()),
            system_instruction: system_prompt.map(|sys| GeminiContent {
                parts: vec![GeminiPart {
                    text: sys.to_string(),
                }],
            }),
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "gemini.generate");

        let auth = header_auth(API_KEY_HEADER, &self.api_key)
            .map_err(|e| LlmError::Config(format!("invalid Gemini API key: {e}")))?;
        let resp: GeminiResponse = self
            .client
            .post_json_opts(
                &path,
                &request,
                RequestOpts {
                    auth: Some(auth),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_llm)?;

        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            tracing::warn!(%reason, "gemini.prompt_blocked");
            return Err(LlmError::Blocked.into());
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Empty("no candidates returned from Gemini".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(LlmError::Blocked.into());
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::Empty("no content parts in Gemini response".to_string()).into());
        }

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used: resp.usage_metadata.and_then(|u| u.total_token_count),
            finish_reason: candidate.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.generate("Respond with just 'OK'", None, Some(5), Some(0.1)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
