// ABOUTME: Static HTTP document source: fetch with size limits and charset-aware decoding.
// ABOUTME: Also fetches binary assets with a per-request timeout.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use super::{AssetFetcher, DocumentSource};
use crate::error::HarvestError;
use crate::page::HtmlPage;

/// Maximum allowed document length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Result of a successful document fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using the content-type charset or detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

fn send_error(url: &str, op: &str, err: reqwest::Error) -> HarvestError {
    if err.is_timeout() {
        HarvestError::timeout(url, op, Some(anyhow::anyhow!("request timed out: {}", err)))
    } else {
        HarvestError::fetch(url, op, Some(anyhow::anyhow!("request failed: {}", err)))
    }
}

fn parse_http_url(url: &str, op: &str) -> Result<Url, HarvestError> {
    if url.is_empty() {
        return Err(HarvestError::invalid_url(url, op, None));
    }
    let parsed = Url::parse(url).map_err(|e| {
        HarvestError::invalid_url(url, op, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(HarvestError::invalid_url(
            url,
            op,
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }
    Ok(parsed)
}

/// Plain HTTP fetch-and-parse source.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    headers: HashMap<String, String>,
}

impl HttpSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            headers: HashMap::new(),
        }
    }

    /// Returns a source sharing this client with `extra` headers added.
    pub fn with_headers(&self, extra: &HashMap<String, String>) -> Self {
        let mut headers = self.headers.clone();
        headers.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            client: self.client.clone(),
            headers,
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        request
    }

    /// Fetches a document. Any status other than 200 is a Status error.
    pub async fn fetch_document(&self, url: &str) -> Result<FetchResult, HarvestError> {
        const OP: &str = "FetchDocument";
        parse_http_url(url, OP)?;

        let response = self
            .request(url)
            .send()
            .await
            .map_err(|e| send_error(url, OP, e))?;

        let content_length = response.content_length().or_else(|| {
            response
                .headers()
                .get("content-length")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
        });
        if let Some(len) = content_length {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(HarvestError::fetch(
                    url,
                    OP,
                    Some(anyhow::anyhow!("content too large")),
                ));
            }
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        if status != 200 {
            return Err(HarvestError::status(url, OP, status));
        }

        let body = response.bytes().await.map_err(|e| send_error(url, OP, e))?;
        if body.len() > MAX_CONTENT_LENGTH {
            return Err(HarvestError::fetch(
                url,
                OP,
                Some(anyhow::anyhow!("content too large")),
            ));
        }

        debug!(url, status, bytes = body.len(), "fetched document");
        Ok(FetchResult {
            status,
            url: url.to_string(),
            final_url,
            content_type,
            body,
        })
    }
}

#[async_trait(?Send)]
impl DocumentSource for HttpSource {
    async fn open(&self, url: &str, _ready: &[String]) -> Result<HtmlPage, HarvestError> {
        let fetched = self.fetch_document(url).await?;
        let base = Url::parse(&fetched.final_url).ok();
        Ok(HtmlPage::parse(base, &fetched.text()))
    }
}

#[async_trait]
impl AssetFetcher for HttpSource {
    async fn fetch_asset(&self, url: &str, timeout: Duration) -> Result<Bytes, HarvestError> {
        const OP: &str = "FetchAsset";
        parse_http_url(url, OP)?;

        let response = self
            .request(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| send_error(url, OP, e))?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(HarvestError::status(url, OP, status));
        }
        response.bytes().await.map_err(|e| send_error(url, OP, e))
    }
}
