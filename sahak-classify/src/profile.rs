//! Free-form world-history summaries from a wiki article.

use crate::prompt::fill;
use crate::ClassifyError;
use sahak_common::cache::TtlCache;
use sahak_llm::traits::LlmClient;
use sahak_web::DocumentSource;
use std::sync::Arc;
use std::time::Duration;

const PROFILE_PROMPT: &str = "당신은 세계사 전문 역사 선생님입니다.\n\
아래 [위키백과 텍스트]를 바탕으로 인물 '{name}'에 대해 학생들에게 설명하듯 정리해주세요.\n\n\
[위키백과 텍스트]\n{text}\n\n\
[출력 형식]\n\
마크다운을 사용하여 한 줄 소개, 기본 정보, 주요 업적(3가지), 역사적 평가, 흥미로운 사실 순으로 작성하세요.";

/// Characters of article text shown as the source excerpt.
pub const EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub source_text: String,
    pub model_failed: bool,
}

impl Profile {
    /// Leading part of the article text, marked as cut.
    pub fn excerpt(&self) -> String {
        let head = sahak_web::extract::truncate_chars(&self.source_text, EXCERPT_CHARS);
        format!("{head}...")
    }
}

pub struct Profiler {
    source: Arc<dyn DocumentSource>,
    llm: Arc<dyn LlmClient + Send + Sync>,
    summaries: Option<TtlCache<(String, String), String>>,
}

impl Profiler {
    pub fn new(source: Arc<dyn DocumentSource>, llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self {
            source,
            llm,
            summaries: None,
        }
    }

    /// Memoize summaries on `(name, article text)` for `ttl`.
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.summaries = Some(TtlCache::new("profile.summaries", ttl));
        self
    }

    pub async fn run(&self, name: &str) -> Result<Profile, ClassifyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClassifyError::EmptyName);
        }
        let article = self
            .source
            .snippet(name)
            .await
            .ok_or_else(|| ClassifyError::NotFound(name.to_string()))?;

        let prompt = fill(PROFILE_PROMPT, &[("name", name), ("text", &article.text)]);
        let llm = &self.llm;
        let call = || async move { llm.complete(&prompt).await };
        let result = match &self.summaries {
            Some(cache) => {
                cache
                    .get_or_try_compute((name.to_string(), article.text.clone()), call)
                    .await
            }
            None => call().await,
        };

        let (summary, model_failed) = match result {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::warn!(name, error = %e, "profile.failed");
                (format!("분석 중 오류 발생: {e}"), true)
            }
        };

        Ok(Profile {
            name: name.to_string(),
            summary,
            image_url: article.image_url,
            source_text: article.text,
            model_failed,
        })
    }
}
