use crate::prompt::PromptTemplate;
use crate::vocabulary::Vocabulary;
use sahak_common::cache::{CacheStats, TtlCache};
use sahak_common::Grounding;
use sahak_llm::traits::LlmClient;
use std::sync::Arc;
use std::time::Duration;

type ReplyKey = (String, Option<String>);

/// Raw model reply for one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub reply: String,
    pub grounding: Grounding,
    /// The model call failed and `reply` is the error sentinel.
    pub failed: bool,
}

/// One model call per classification, optionally memoized on the exact
/// `(name, snippet)` pair.
#[derive(Clone)]
pub struct Classifier {
    llm: Arc<dyn LlmClient + Send + Sync>,
    template: PromptTemplate,
    error_label: String,
    replies: Option<TtlCache<ReplyKey, String>>,
}

impl Classifier {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        template: PromptTemplate,
        vocabulary: &Vocabulary,
    ) -> Self {
        Self {
            llm,
            template,
            error_label: vocabulary.error_label().to_string(),
            replies: None,
        }
    }

    /// Memoize successful replies for `ttl`.
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.replies = Some(TtlCache::new("classifier.replies", ttl));
        self
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.replies.as_ref().map(TtlCache::stats)
    }

    /// Never fails: a model error becomes the sentinel reply, which is not
    /// memoized.
    pub async fn classify(&self, name: &str, snippet: Option<&str>) -> Classification {
        let prompt = self.template.render(name, snippet);
        let grounding = prompt.grounding;

        let llm = &self.llm;
        let text = prompt.text.as_str();
        let call = move || async move {
            tracing::info!(
                model = llm.model_name(),
                name,
                grounding = ?grounding,
                "classifier.call"
            );
            llm.complete(text).await
        };
        let result = match &self.replies {
            Some(cache) => {
                let key = (name.to_string(), snippet.map(str::to_string));
                cache.get_or_try_compute(key, call).await
            }
            None => call().await,
        };

        match result {
            Ok(reply) => Classification {
                reply,
                grounding,
                failed: false,
            },
            Err(e) => {
                tracing::warn!(name, error = %e, "classifier.failed");
                Classification {
                    reply: self.template.error_reply(&self.error_label, &e.to_string()),
                    grounding,
                    failed: true,
                }
            }
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("model", &self.llm.model_name())
            .field("label_tag", &self.template.label_tag())
            .field("memoized", &self.replies.is_some())
            .finish()
    }
}
