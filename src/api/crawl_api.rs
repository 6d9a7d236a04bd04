use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::CrawlerConfig;
use crate::engine::session::CrawlSession;
use crate::source::http_source::HttpNodeSource;
use crate::source::traits::NodeSource;

/// Bootstrap a session against the configured server and crawl it to the end.
pub async fn crawl_secret(config: &CrawlerConfig) -> Result<String> {
    let source: Arc<dyn NodeSource> =
        Arc::new(HttpNodeSource::new(config).context("failed to build http client")?);
    let session = CrawlSession::open(source, config).await?;
    let secret = session.run().await?;
    Ok(secret)
}
