use crate::extract::fragments;
use crate::{DocumentSource, Snippet, SourceError, SourceId, SourceOptions};
use async_trait::async_trait;
use sahak_common::BROWSER_USER_AGENT;
use sahak_http::{HeaderMap, HeaderValue, HttpClient, REFERER, RequestOpts};
use scraper::Html;
use std::borrow::Cow;
use std::time::Duration;

pub const HISTORY_DB_BASE_URL: &str = "https://db.history.go.kr/";
const SEARCH_PATH: &str = "search/searchResult.do";
const REFERER_URL: &str = "https://db.history.go.kr/";
const FRAGMENT_SELECTORS: &[&str] = &[".search_list li .cont", ".result_list li"];

/// How many hits to request and which of them become the snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryDbQuery {
    /// `limit` query parameter sent to the search endpoint.
    pub limit: u32,
    /// Leading fragments considered.
    pub take: usize,
    /// Fragments must be strictly longer than this many characters.
    pub min_chars: usize,
}

impl Default for HistoryDbQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            take: 3,
            min_chars: 30,
        }
    }
}

/// Keyword search against the national history database.
#[derive(Clone, Debug)]
pub struct HistoryDb {
    http: HttpClient,
    query: HistoryDbQuery,
}

impl HistoryDb {
    pub fn new(query: HistoryDbQuery) -> Result<Self, SourceError> {
        Self::with_options(query, &SourceOptions::default())
    }

    pub fn with_options(query: HistoryDbQuery, opts: &SourceOptions) -> Result<Self, SourceError> {
        let base = opts.base_url.as_deref().unwrap_or(HISTORY_DB_BASE_URL);
        let http = HttpClient::new(base)?
            .with_timeout(opts.timeout.unwrap_or(Duration::from_secs(5)))
            .with_user_agent(opts.user_agent.as_deref().unwrap_or(BROWSER_USER_AGENT))?;
        Ok(Self { http, query })
    }

    pub fn query(&self) -> HistoryDbQuery {
        self.query
    }

    /// Snippet text from a search result page, `None` when no fragment survives.
    pub fn extract(&self, html: &str) -> Result<Option<String>, SourceError> {
        let doc = Html::parse_document(html);
        let kept = fragments(&doc, FRAGMENT_SELECTORS, self.query.take, self.query.min_chars)?;
        if kept.is_empty() {
            return Ok(None);
        }
        Ok(Some(kept.join(" ")))
    }
}

#[async_trait]
impl DocumentSource for HistoryDb {
    fn id(&self) -> SourceId {
        SourceId::HistoryDb
    }

    async fn fetch(&self, name: &str) -> Result<Option<Snippet>, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));
        let limit = self.query.limit.to_string();
        let html = self
            .http
            .get_text(
                SEARCH_PATH,
                RequestOpts {
                    headers: Some(headers),
                    query: Some(vec![
                        ("searchKeyword", Cow::Borrowed(name)),
                        ("limit", Cow::Owned(limit)),
                    ]),
                    ..Default::default()
                },
            )
            .await?;
        Ok(self
            .extract(&html)?
            .map(|text| Snippet::new(SourceId::HistoryDb, text)))
    }
}
