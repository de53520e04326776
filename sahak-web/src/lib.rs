//! Document sources for grounding snippets.
//!
//! - [`DocumentSource`]: capability `name -> Option<Snippet>` with one adapter
//!   per external site
//! - [`history_db`]: national history database keyword search
//! - [`encykorea`]: Encyclopedia of Korean Culture article search
//! - [`wikipedia`]: Korean Wikipedia article body and infobox image
//! - [`extract`]: selector helpers shared by the adapters
//!
//! Every lookup is a single GET. Adapters report failures through
//! [`SourceError`]; callers normally go through [`DocumentSource::snippet`],
//! which logs the failure and degrades it to "no snippet".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub mod encykorea;
pub mod extract;
pub mod history_db;
pub mod wikipedia;

pub use encykorea::EncyKorea;
pub use history_db::HistoryDb;
pub use wikipedia::Wikipedia;

/// Identifies which external site produced a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceId {
    HistoryDb,
    EncyKorea,
    Wikipedia,
}

impl SourceId {
    /// Human-readable site name used when presenting a snippet.
    pub fn label(self) -> &'static str {
        match self {
            SourceId::HistoryDb => "한국사데이터베이스",
            SourceId::EncyKorea => "한국민족문화대백과사전",
            SourceId::Wikipedia => "위키백과",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceId::HistoryDb => "history-db",
            SourceId::EncyKorea => "encykorea",
            SourceId::Wikipedia => "wikipedia",
        };
        f.write_str(s)
    }
}

/// Bounded text extracted from one external document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub source: SourceId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Snippet {
    pub fn new(source: SourceId, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
            image_url: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] sahak_http::HttpError),

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("invalid lookup url: {0}")]
    Url(String),
}

/// Per-adapter knobs that configuration may override.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// A site that can be searched for a person's name.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// One lookup. `Ok(None)` means the page had nothing usable.
    async fn fetch(&self, name: &str) -> Result<Option<Snippet>, SourceError>;

    /// Like [`DocumentSource::fetch`], with every failure downgraded to `None`.
    async fn snippet(&self, name: &str) -> Option<Snippet> {
        match self.fetch(name).await {
            Ok(Some(snippet)) => {
                tracing::debug!(
                    source = %self.id(),
                    name,
                    chars = snippet.text.chars().count(),
                    "source.snippet"
                );
                Some(snippet)
            }
            Ok(None) => {
                tracing::debug!(source = %self.id(), name, "source.empty");
                None
            }
            Err(e) => {
                tracing::warn!(source = %self.id(), name, error = %e, "source.failed");
                None
            }
        }
    }
}

/// `base` with `segments` appended, each percent-encoded as one path segment.
pub(crate) fn segment_url(base: &url::Url, segments: &[&str]) -> Result<url::Url, SourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SourceError::Url(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
