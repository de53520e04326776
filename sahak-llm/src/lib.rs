//! LLM integration for sahak.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and the Gemini
//! implementation used by the classifier. [`ensure_llm_ready`] builds a
//! shareable client from a [`sahak_common::LlmConfig`].
//!
//! # Examples
//! ```no_run
//! use sahak_common::{LlmConfig, Result};
//! use sahak_llm::{ensure_llm_ready, DEFAULT_GEMINI_MODEL};
//!
//! # fn main() -> Result<()> {
//! let cfg = LlmConfig::Gemini {
//!     api_key: "AIza...".into(),
//!     model: DEFAULT_GEMINI_MODEL.into(),
//!     endpoint: None,
//!     timeout_secs: None,
//!     temperature: Some(0.2),
//!     max_tokens: None,
//! };
//! let client = ensure_llm_ready(&cfg)?;
//! assert_eq!(client.model_name(), DEFAULT_GEMINI_MODEL);
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod traits;

use gemini::{GeminiClient, GEMINI_BASE_URL};
use sahak_common::{LlmConfig, SahakError};
use std::sync::Arc;
use std::time::Duration;
use traits::LlmClient;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

/// Build the configured LLM client.
pub fn ensure_llm_ready(
    config: &LlmConfig,
) -> sahak_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config {
        LlmConfig::Gemini {
            api_key,
            model,
            endpoint,
            timeout_secs,
            temperature,
            max_tokens,
        } => {
            let base = endpoint.as_deref().unwrap_or(GEMINI_BASE_URL);
            let mut client = GeminiClient::with_base_url(base, api_key.clone(), model.clone())?
                .with_sampling(*temperature, *max_tokens);
            if let Some(secs) = timeout_secs {
                client = client.with_timeout(Duration::from_secs(*secs));
            }
            tracing::info!(model = %model, endpoint = %base, "llm.ready");
            Ok(Arc::new(client))
        }
        LlmConfig::None => Err(SahakError::Config("No LLM configured".to_string())),
    }
}
