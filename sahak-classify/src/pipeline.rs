use crate::classifier::Classifier;
use crate::pages::{PageId, PagePreset};
use crate::verdict::Verdict;
use crate::vocabulary::{Label, Vocabulary};
use crate::ClassifyError;
use sahak_common::cache::{CacheStats, TtlCache};
use sahak_common::{Grounding, DEFAULT_CACHE_TTL};
use sahak_llm::traits::LlmClient;
use sahak_web::{DocumentSource, Snippet};
use std::sync::Arc;
use std::time::Duration;

/// Memoization knobs shared by the snippet and reply caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Result of classifying one person on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub name: String,
    pub label: Label,
    pub explanation: String,
    /// `None` when the user made no guess.
    pub verdict: Option<Verdict>,
    pub guess: Option<String>,
    pub snippet: Option<Snippet>,
    pub grounding: Grounding,
    pub reply: String,
    pub model_failed: bool,
}

/// Fetch, classify, parse and compare for one page.
pub struct Pipeline {
    page: PageId,
    vocabulary: Vocabulary,
    source: Arc<dyn DocumentSource>,
    classifier: Classifier,
    snippets: Option<TtlCache<String, Option<Snippet>>>,
}

impl Pipeline {
    pub fn new(
        preset: PagePreset,
        source: Arc<dyn DocumentSource>,
        llm: Arc<dyn LlmClient + Send + Sync>,
        settings: PipelineSettings,
    ) -> Self {
        let mut classifier = Classifier::new(llm, preset.template, &preset.vocabulary);
        if settings.cache_enabled && preset.memoize_classification {
            classifier = classifier.with_cache(settings.cache_ttl);
        }
        let snippets = settings
            .cache_enabled
            .then(|| TtlCache::new("pipeline.snippets", settings.cache_ttl));
        Self {
            page: preset.id,
            vocabulary: preset.vocabulary,
            source,
            classifier,
            snippets,
        }
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// One lookup followed by one model call, in that order.
    ///
    /// The guess is validated before anything goes over the network.
    pub async fn run(&self, name: &str, guess: Option<&str>) -> Result<Assessment, ClassifyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClassifyError::EmptyName);
        }
        let guess = guess.map(|g| self.vocabulary.validate_guess(g)).transpose()?;

        let snippet = self.lookup(name).await;
        let classification = self
            .classifier
            .classify(name, snippet.as_ref().map(|s| s.text.as_str()))
            .await;
        let parsed = self.vocabulary.parse(&classification.reply);
        let verdict = guess.as_deref().map(|g| Verdict::compare(&parsed.label, g));

        tracing::info!(
            page = %self.page,
            name,
            label = %parsed.label,
            verdict = ?verdict,
            grounding = ?classification.grounding,
            "pipeline.assessed"
        );

        Ok(Assessment {
            name: name.to_string(),
            label: parsed.label,
            explanation: parsed.explanation,
            verdict,
            guess,
            snippet,
            grounding: classification.grounding,
            reply: classification.reply,
            model_failed: classification.failed,
        })
    }

    async fn lookup(&self, name: &str) -> Option<Snippet> {
        match &self.snippets {
            Some(cache) => {
                cache
                    .get_or_compute(name.to_string(), || self.source.snippet(name))
                    .await
            }
            None => self.source.snippet(name).await,
        }
    }

    pub fn cache_stats(&self) -> (Option<CacheStats>, Option<CacheStats>) {
        (
            self.snippets.as_ref().map(TtlCache::stats),
            self.classifier.cache_stats(),
        )
    }
}
