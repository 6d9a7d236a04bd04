// Crawl session — bootstraps a token once, then runs the traversal with it.

use std::sync::Arc;

use tracing::info;

use super::crawler::Crawler;
use super::stats::CrawlStatsSnapshot;
use crate::config::CrawlerConfig;
use crate::error::CrawlError;
use crate::source::traits::NodeSource;

pub struct CrawlSession {
    token: String,
    root_id: String,
    crawler: Crawler,
}

impl CrawlSession {
    /// Obtain a session token from `source`. Nothing is crawled if this fails.
    pub async fn open(source: Arc<dyn NodeSource>, config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let token = source.open_session().await.map_err(CrawlError::Bootstrap)?;
        info!(
            "crawl session opened: root={} max_concurrency={}",
            config.root_id,
            config.effective_concurrency()
        );
        Ok(Self {
            token,
            root_id: config.root_id.clone(),
            crawler: Crawler::new(source, config.effective_concurrency()),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Crawl the tree from the configured root and return the reassembled secret.
    pub async fn run(&self) -> Result<String, CrawlError> {
        self.crawler.crawl(&self.root_id, &self.token).await
    }

    pub fn stats(&self) -> CrawlStatsSnapshot {
        self.crawler.stats().snapshot()
    }
}
