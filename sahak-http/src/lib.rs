//! Minimal HTTP client with safe logging and flexible auth.
//!
//! - Request options: headers, `Auth`, query params, timeout
//! - Text (HTML) and JSON helpers over a single request path
//! - Redacts sensitive query params and headers; never logs secret values
//! - One attempt per call: failures are reported, never retried
//! - Optional *raw* request/response logging via `SAHAK_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```no_run
//! # async fn demo() -> Result<(), sahak_http::HttpError> {
//! let client = sahak_http::HttpClient::new("https://db.history.go.kr/")?;
//! let html = client
//!     .get_text("search/searchResult.do", sahak_http::RequestOpts::default())
//!     .await?;
//! # let _ = html;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `SAHAK_HTTP_RAW=1`.

use reqwest::header::USER_AGENT;
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::env;
use std::time::Duration;
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "SAHAK_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;

const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

const SECRET_HEADERS: &[&str] = &["authorization", "x-goog-api-key", "x-api-key", "cookie"];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_param(name: &str) -> bool {
    SECRET_PARAMS.contains(&name.to_ascii_lowercase().as_str())
}

fn is_secret_header(name: &str) -> bool {
    SECRET_HEADERS.contains(&name.to_ascii_lowercase().as_str())
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        if let Ok(s) = std::str::from_utf8(bytes) {
            let mut s = s.to_string();
            if s.len() > RAW_MAX_BODY {
                s = truncate_at_char_boundary(&s, RAW_MAX_BODY).to_string();
                s.push('…');
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    parts.push(format!("'{}'", redact_url(url)));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Copy of `url` with secret query values replaced.
fn redact_url(url: &Url) -> Url {
    let mut out = url.clone();
    if url.query().is_none() {
        return out;
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for [`HttpError::Api`], if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// How a request authenticates. Build header auth with [`header_auth`].
#[derive(Clone, Debug)]
pub enum Auth {
    /// Secret header such as `x-goog-api-key`, marked sensitive.
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    None,
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use sahak_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     query: Some(vec![("searchKeyword", Cow::Borrowed("김옥균"))]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 5);
/// assert!(!opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    user_agent: Option<HeaderValue>,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use sahak_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://ko.wikipedia.org/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            user_agent: None,
            default_timeout: Duration::from_secs(15),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Send this `User-Agent` with every request.
    pub fn with_user_agent(mut self, ua: &str) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(ua)
            .map_err(|e| HttpError::Build(format!("invalid user agent: {e}")))?;
        self.user_agent = Some(value);
        Ok(self)
    }

    /// Resolve `path` against the base, or take it verbatim when absolute
    /// URLs are allowed.
    pub fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// GET a text body (HTML pages). Non-2xx statuses are errors.
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let (_, bytes) = self
            .send_internal::<()>(Method::GET, path, None, opts)
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let (req_id, bytes) = self
            .send_internal::<()>(Method::GET, path, None, opts)
            .await?;
        decode_json(&req_id, &bytes)
    }

    /// POST JSON with per-request options.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (req_id, bytes) = self
            .send_internal(Method::POST, path, Some(body), opts)
            .await?;
        decode_json(&req_id, &bytes)
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send_internal<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<(String, bytes::Bytes), HttpError>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self.resolve(path, opts.allow_absolute)?;

        if let Some(query) = opts.query.as_deref().filter(|q| !q.is_empty()) {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_ref())));
        }

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let mut rb = self.inner.request(method.clone(), url.clone()).timeout(timeout);

        let mut headers = HeaderMap::new();
        if let Some(ua) = &self.user_agent {
            headers.insert(USER_AGENT, ua.clone());
        }
        if let Some(hdrs) = &opts.headers {
            for (k, v) in hdrs.iter() {
                headers.insert(k, v.clone());
            }
        }

        let mut request_body_bytes: Option<Vec<u8>> = None;
        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            headers.insert(
                reqwest::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            request_body_bytes = Some(bytes.clone());
            rb = rb.body(bytes);
        }

        let auth_kind = match &opts.auth {
            Some(Auth::Header { name, value }) => {
                headers.insert(name.clone(), value.clone());
                "header"
            }
            Some(Auth::None) | None => "none",
        };
        rb = rb.headers(headers.clone());

        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());
        let logged_url = redact_url(&url);

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            query=?logged_url.query(),
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, &headers, request_body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send (single attempt) -----
        let t0 = std::time::Instant::now();
        let resp = rb
            .send()
            .await
            .map_err(|err| transport_error(&req_id, err, timeout, "send"))?;
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| transport_error(&req_id, err, timeout, "body"))?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = resp_headers
            .get("x-request-id")
            .or_else(|| resp_headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&resp_headers);
            let text = String::from_utf8_lossy(&bytes);
            let truncated = text.len() > RAW_MAX_BODY;
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%truncate_at_char_boundary(&text, RAW_MAX_BODY),
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return Ok((req_id, bytes));
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%req_hdr_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: req_hdr_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn transport_error(req_id: &str, err: reqwest::Error, timeout: Duration, phase: &str) -> HttpError {
    if err.is_timeout() {
        tracing::warn!(req_id=%req_id, phase, timeout_ms=timeout.as_millis() as u64, "http.timeout");
        return HttpError::Timeout(timeout);
    }
    let message = err.to_string();
    tracing::warn!(req_id=%req_id, phase, message=%message, "http.network_error");
    HttpError::Network(message)
}

fn decode_json<T: DeserializeOwned>(req_id: &str, bytes: &[u8]) -> Result<T, HttpError> {
    serde_json::from_slice::<T>(bytes).map_err(|e| {
        let snippet = snip_body(bytes);
        tracing::warn!(
            req_id=%req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e.to_string(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn extract_error_message(body: &[u8]) -> String {
    // Google / OpenAI style: {"error":{"message":"...", "status":"..."}}
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        #[serde(default)]
        message: String,
        #[serde(default)]
        status: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Envelope>(body) {
        match (env.error.message.is_empty(), env.error.status.is_empty()) {
            (false, false) => return format!("{} ({})", env.error.message, env.error.status),
            (false, true) => return env.error.message,
            (true, false) => return env.error.status,
            (true, true) => {}
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() > 500 {
        format!("{}...", truncate_at_char_boundary(&text, 500))
    } else {
        text.into_owned()
    }
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }
    Ok(s)
}

/// Build an `Auth::Header` for a secret header, rejecting malformed keys.
pub fn header_auth(name: &'static str, secret: &str) -> Result<Auth, HttpError> {
    let cleaned = sanitize_api_key(secret)?;
    let mut value =
        HeaderValue::from_str(&cleaned).map_err(|e| HttpError::Build(e.to_string()))?;
    value.set_sensitive(true);
    Ok(Auth::Header {
        name: HeaderName::from_static(name),
        value,
    })
}
