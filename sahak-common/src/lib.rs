//! Common types and utilities shared across the sahak crates.
//!
//! This crate defines the shared error type, the tracing initialisation used
//! by the binary and by integration tests, and the time-bounded cache that
//! memoizes document lookups and model calls. It is kept dependency-light so
//! every other crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`SahakError`] and [`Result`]: shared error handling
//! - [`LlmConfig`]: provider configuration handed to `sahak-llm`
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`cache`]: [`cache::TtlCache`], an explicit get-or-compute cache with a
//!   freshness window
//!
//! # Examples
//!
//! ```rust
//! use sahak_common::{SahakError, DEFAULT_CACHE_TTL};
//!
//! let err = SahakError::Config("missing GEMINI_API_KEY".into());
//! assert!(err.to_string().contains("GEMINI_API_KEY"));
//! assert_eq!(DEFAULT_CACHE_TTL.as_secs(), 3600);
//! ```
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod cache;
pub mod observability;

/// Freshness window used for memoized lookups and model replies.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Browser-like user agent sent to document hosts that reject bare clients.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0 Safari/537.36";

/// Minimal user agent used by the encyclopedia and wiki lookups.
pub const SHORT_USER_AGENT: &str = "Mozilla/5.0";

/// Where the grounding text of an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grounding {
    /// The prompt embedded a snippet fetched from a document source.
    Snippet,
    /// No snippet was available; the model answered from its own knowledge.
    Knowledge,
}

impl Grounding {
    /// Short, user-facing description of the grounding mode.
    pub fn describe(self) -> &'static str {
        match self {
            Grounding::Snippet => "📚 사료 기반 분석",
            Grounding::Knowledge => "🧠 AI 지식 기반 분석 (사료 없음)",
        }
    }
}

/// Configuration for the LLM provider behind the classifier.
///
/// See the `sahak-llm` crate for the concrete client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum LlmConfig {
    Gemini {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_tokens: Option<u32>,
    },
    #[default]
    None,
}

impl LlmConfig {
    /// Same provider settings with another model.
    pub fn with_model(self, model: impl Into<String>) -> Self {
        match self {
            LlmConfig::Gemini {
                api_key,
                endpoint,
                timeout_secs,
                temperature,
                max_tokens,
                ..
            } => LlmConfig::Gemini {
                api_key,
                model: model.into(),
                endpoint,
                timeout_secs,
                temperature,
                max_tokens,
            },
            LlmConfig::None => LlmConfig::None,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            LlmConfig::Gemini { model, .. } => Some(model),
            LlmConfig::None => None,
        }
    }
}

/// Error types used across the sahak workspace.
#[derive(thiserror::Error, Debug)]
pub enum SahakError {
    /// The language model call failed or returned an unusable reply.
    #[error("LLM error: {0}")]
    Llm(String),

    /// An outbound HTTP exchange failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for lower layers reporting through `anyhow`.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`SahakError`].
pub type Result<T> = std::result::Result<T, SahakError>;
