// Error taxonomy — fetch-level failures and the fatal outcomes of a crawl.

use thiserror::Error;

/// Failure of a single request against the remote tree.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },
    #[error("undecodable payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("session response carried no token")]
    MissingSession,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Fatal outcome of a crawl. There is no partial-success variant.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("session bootstrap failed: {0}")]
    Bootstrap(#[source] FetchError),
    #[error("fetch of node {id:?} failed: {source}")]
    Fetch {
        id: String,
        #[source]
        source: FetchError,
    },
    #[error("protocol violation at node {id:?}: unexpected message {message:?}")]
    Protocol { id: String, message: String },
    #[error("crawl interrupted: {reason}")]
    Interrupted { reason: String },
}

impl CrawlError {
    /// Short name of the stage that failed, used in diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            CrawlError::Bootstrap(_) => "bootstrap",
            CrawlError::Fetch { .. } => "fetch",
            CrawlError::Protocol { .. } => "protocol",
            CrawlError::Interrupted { .. } => "engine",
        }
    }
}
