use crate::extract::{first_attr, raw_text, selector, truncate_chars};
use crate::{DocumentSource, Snippet, SourceError, SourceId, SourceOptions, segment_url};
use async_trait::async_trait;
use sahak_common::SHORT_USER_AGENT;
use sahak_http::{HttpClient, RequestOpts};
use scraper::Html;
use std::time::Duration;

pub const WIKIPEDIA_BASE_URL: &str = "https://ko.wikipedia.org/";
pub const WIKIPEDIA_MAX_CHARS: usize = 6000;
const IMAGE_SELECTORS: &[&str] = &[".infobox img", ".mw-parser-output .thumb img"];

/// Korean Wikipedia article lookup by exact title.
#[derive(Clone, Debug)]
pub struct Wikipedia {
    http: HttpClient,
}

/// Article paragraphs and the lead image, as found on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WikiArticle {
    pub text: String,
    pub image_url: Option<String>,
}

impl Wikipedia {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_options(&SourceOptions::default())
    }

    pub fn with_options(opts: &SourceOptions) -> Result<Self, SourceError> {
        let base = opts.base_url.as_deref().unwrap_or(WIKIPEDIA_BASE_URL);
        let http = HttpClient::new(base)?
            .with_timeout(opts.timeout.unwrap_or(Duration::from_secs(5)))
            .with_user_agent(opts.user_agent.as_deref().unwrap_or(SHORT_USER_AGENT))?;
        Ok(Self { http })
    }

    pub fn extract(html: &str) -> Result<WikiArticle, SourceError> {
        let doc = Html::parse_document(html);
        let content = selector("div.mw-parser-output")?;
        let para = selector("p")?;

        let mut text = String::new();
        if let Some(div) = doc.select(&content).next() {
            for p in div.select(&para) {
                text.push_str(&raw_text(&p));
                text.push('\n');
            }
        }
        let text = truncate_chars(&text, WIKIPEDIA_MAX_CHARS).to_string();

        let image_url = first_attr(&doc, IMAGE_SELECTORS, "src")?.map(|src| {
            match src.strip_prefix("//") {
                Some(rest) => format!("https://{rest}"),
                None => src,
            }
        });

        Ok(WikiArticle { text, image_url })
    }
}

#[async_trait]
impl DocumentSource for Wikipedia {
    fn id(&self) -> SourceId {
        SourceId::Wikipedia
    }

    async fn fetch(&self, name: &str) -> Result<Option<Snippet>, SourceError> {
        let url = segment_url(self.http.base(), &["wiki", name])?;
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
        let article = Self::extract(&html)?;
        if article.text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Snippet {
            source: SourceId::Wikipedia,
            text: article.text,
            image_url: article.image_url,
        }))
    }
}
