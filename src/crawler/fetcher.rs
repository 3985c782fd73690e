//! HTTP fetcher implementation
//!
//! This module handles single HTTP requests for the crawler:
//! - Building the HTTP client (no automatic redirects, bounded timeouts)
//! - Applying the query-string option to the request target
//! - Classifying responses
//! - Resolving `Location` headers of redirects

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::{explicit_scheme, folder_root, origin_of};
use crate::{UrlError, WeaverError};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// What a single response means to the crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// 2xx with an HTML content type
    Html,
    /// 2xx with any other content type
    NonHtml,
    /// 3xx
    Redirect,
    /// 1xx, 4xx, 5xx
    Unhandled,
}

/// A response reduced to what the crawler needs
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Location header value
    pub location: Option<String>,
    /// Body, only read for HTML responses
    pub body: String,
}

impl FetchResponse {
    /// Classifies this response
    pub fn kind(&self) -> ResponseKind {
        match self.status {
            200..=299 if is_html(self.content_type.as_deref()) => ResponseKind::Html,
            200..=299 => ResponseKind::NonHtml,
            300..=399 => ResponseKind::Redirect,
            _ => ResponseKind::Unhandled,
        }
    }
}

/// True if a Content-Type value starts with `text/html`
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed by the client; the crawler walks redirect
/// chains itself so every hop is recorded.
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the URL actually requested for an address
///
/// The query string is kept only when `include_query_params` is set. An
/// empty path is requested as `/`.
pub fn request_target(address: &str, include_query_params: bool) -> Result<Url, UrlError> {
    let mut target =
        Url::parse(address).map_err(|e| UrlError::Parse(format!("{}: {}", address, e)))?;

    if !include_query_params {
        target.set_query(None);
    }
    target.set_fragment(None);

    Ok(target)
}

/// Resolves a redirect `Location` against the address that returned it
///
/// Locations with an `http`/`https` scheme are used as-is; any other
/// explicit scheme cannot be fetched and is an error. Root-relative
/// locations get the current scheme, host and port, query-only locations
/// replace the current query, and other relative locations are appended to
/// the current folder.
pub fn resolve_location(location: &str, current: &str) -> Result<String, UrlError> {
    let location = location.trim();

    match explicit_scheme(location).as_deref() {
        Some("http") | Some("https") => return Ok(location.to_string()),
        Some(scheme) => {
            return Err(UrlError::Parse(format!(
                "unsupported redirect scheme {} in {}",
                scheme, location
            )))
        }
        None => {}
    }

    if location.starts_with("//") {
        let scheme = Url::parse(current)
            .map_err(|e| UrlError::Parse(format!("{}: {}", current, e)))?
            .scheme()
            .to_string();
        return Ok(format!("{}:{}", scheme, location));
    }

    if location.starts_with('/') {
        return Ok(format!("{}{}", origin_of(current)?, location));
    }

    let current_path = current.split(['?', '#']).next().unwrap_or(current);
    if location.starts_with('?') {
        return Ok(format!("{}{}", current_path, location));
    }
    if location.is_empty() || location.starts_with('#') {
        return Ok(current_path.to_string());
    }

    Ok(format!("{}{}", folder_root(current), location))
}

/// Performs one GET per call; connections may be reused by the client
pub struct Fetcher {
    client: Client,
    include_query_params: bool,
}

impl Fetcher {
    /// Creates a fetcher from the crawler configuration
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, WeaverError> {
        Ok(Self {
            client: build_http_client(crawler, user_agent)?,
            include_query_params: crawler.include_query_params,
        })
    }

    /// Issues a GET for `address`
    ///
    /// The body is only read for HTML 2xx responses.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - Any HTTP response, whatever its status
    /// * `Err(WeaverError::Transport)` - Connection, DNS, timeout or protocol failure
    /// * `Err(WeaverError::Url)` - The address cannot be parsed
    pub async fn get(&self, address: &str) -> Result<FetchResponse, WeaverError> {
        let target = request_target(address, self.include_query_params)?;
        tracing::info!("Fetching: {}", target);

        let transport = |source| WeaverError::Transport {
            url: address.to_string(),
            source,
        };

        let response = self.client.get(target).send().await.map_err(transport)?;

        let status = response.status().as_u16();
        let content_type = header_string(&response, CONTENT_TYPE.as_str());
        let location = header_string(&response, LOCATION.as_str());

        let mut fetched = FetchResponse {
            status,
            content_type,
            location,
            body: String::new(),
        };

        if fetched.kind() == ResponseKind::Html {
            fetched.body = response.text().await.map_err(transport)?;
        }

        Ok(fetched)
    }
}

fn header_string(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
