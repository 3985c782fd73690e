use serde::Deserialize;

/// Main configuration structure for Link-Weaver
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Append the query string of a URL to the request path when fetching
    #[serde(rename = "include-query-params")]
    pub include_query_params: bool,

    /// Maximum number of redirect hops followed for one dequeued URL
    #[serde(rename = "redirect-limit")]
    pub redirect_limit: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Abort the whole run when a redirect chain exceeds the limit
    #[serde(rename = "halt-on-redirect-overflow")]
    pub halt_on_redirect_overflow: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            include_query_params: true,
            redirect_limit: 10,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            halt_on_redirect_overflow: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "LinkWeaver".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file, or `:memory:`
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: ":memory:".to_string(),
        }
    }
}
