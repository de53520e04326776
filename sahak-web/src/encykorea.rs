use crate::extract::{selector, stripped_text, truncate_chars};
use crate::{DocumentSource, Snippet, SourceError, SourceId, SourceOptions, segment_url};
use async_trait::async_trait;
use sahak_common::SHORT_USER_AGENT;
use sahak_http::{HttpClient, RequestOpts};
use scraper::Html;
use std::time::Duration;

pub const ENCYKOREA_BASE_URL: &str = "https://encykorea.aks.ac.kr/";
pub const ENCYKOREA_MAX_CHARS: usize = 4000;

/// Article search on the Encyclopedia of Korean Culture.
#[derive(Clone, Debug)]
pub struct EncyKorea {
    http: HttpClient,
}

impl EncyKorea {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_options(&SourceOptions::default())
    }

    pub fn with_options(opts: &SourceOptions) -> Result<Self, SourceError> {
        let base = opts.base_url.as_deref().unwrap_or(ENCYKOREA_BASE_URL);
        let http = HttpClient::new(base)?
            .with_timeout(opts.timeout.unwrap_or(Duration::from_secs(10)))
            .with_user_agent(opts.user_agent.as_deref().unwrap_or(SHORT_USER_AGENT))?;
        Ok(Self { http })
    }

    /// Result list text, or the whole body when the list is missing.
    pub fn extract(html: &str) -> Result<Option<String>, SourceError> {
        let doc = Html::parse_document(html);
        let list = selector("div.search_list")?;
        let body = selector("body")?;
        let Some(area) = doc.select(&list).next().or_else(|| doc.select(&body).next()) else {
            return Ok(None);
        };
        let text = stripped_text(&area);
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(truncate_chars(&text, ENCYKOREA_MAX_CHARS).to_string()))
    }
}

#[async_trait]
impl DocumentSource for EncyKorea {
    fn id(&self) -> SourceId {
        SourceId::EncyKorea
    }

    async fn fetch(&self, name: &str) -> Result<Option<Snippet>, SourceError> {
        let url = segment_url(self.http.base(), &["Article", "Search", name])?;
        let html = self
            .http
            .get_text(
                url.as_str(),
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;
        Ok(Self::extract(&html)?.map(|text| Snippet::new(SourceId::EncyKorea, text)))
    }
}
