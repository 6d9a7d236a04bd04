use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::descriptor::{decode_case_insensitive, NodeDescriptor};
use super::traits::NodeSource;
use crate::config::{CrawlerConfig, CONNECT_TIMEOUT_SECS, SESSION_HEADER};
use crate::error::FetchError;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    session: String,
}

/// Node source backed by plain HTTP GETs against the challenge server.
pub struct HttpNodeSource {
    client: Client,
    base_url: String,
    session_url: String,
}

impl HttpNodeSource {
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(1)
            .build()?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            session_url: config.session_url.clone(),
        })
    }

    /// URL a node identifier is fetched from.
    pub fn node_url(&self, id: &str) -> String {
        format!("{}{}", self.base_url, id)
    }

    /// Send the request and return the body of a 200 response.
    async fn fetch_body(&self, req: RequestBuilder, what: &str) -> Result<Bytes, FetchError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            warn!("http {} failed status={}", what, status.as_u16());
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?)
    }
}

#[async_trait]
impl NodeSource for HttpNodeSource {
    async fn open_session(&self) -> Result<String, FetchError> {
        let body = self
            .fetch_body(self.client.get(&self.session_url), "session")
            .await?;
        let resp: SessionResponse = decode_case_insensitive(&body)?;
        if resp.session.is_empty() {
            return Err(FetchError::MissingSession);
        }
        info!("session opened url={}", self.session_url);
        Ok(resp.session)
    }

    async fn fetch_node(&self, id: &str, session: &str) -> Result<NodeDescriptor, FetchError> {
        let url = self.node_url(id);
        let req = self.client.get(&url).header(SESSION_HEADER, session);
        let body = self.fetch_body(req, "fetch").await?;
        debug!("http fetch id={} bytes={}", id, body.len());
        Ok(NodeDescriptor::from_slice(&body)?)
    }
}
