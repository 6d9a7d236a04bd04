use serde::Deserialize;

/// Endpoint that hands out a session token.
pub const SESSION_URL: &str = "http://challenge.curbside.com/get-session";

/// Base URL; a node is fetched from `BASE_URL` + its identifier.
pub const BASE_URL: &str = "http://challenge.curbside.com/";

/// Identifier of the first node of the tree.
pub const ROOT_NODE_ID: &str = "start";

/// Synthetic parent key under which the root node is recorded.
pub const ROOT_KEY: &str = "ROOT";

/// Fragment value meaning "no secret here, keep descending".
pub const NO_SECRET: &str = "no";

/// Request header carrying the session token.
pub const SESSION_HEADER: &str = "session";

/// Maximum number of node fetches allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Whole-request timeout for a single fetch.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// TCP connect timeout for a single fetch.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration for a crawl.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Base URL node identifiers are appended to.
    pub base_url: String,
    /// Session bootstrap endpoint.
    pub session_url: String,
    /// Identifier the traversal starts from.
    pub root_id: String,
    /// Admission cap for concurrent fetches.
    pub max_concurrency: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    /// Admission cap, never below one.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            session_url: SESSION_URL.to_string(),
            root_id: ROOT_NODE_ID.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}
