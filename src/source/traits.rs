use async_trait::async_trait;

use super::descriptor::NodeDescriptor;
use crate::error::FetchError;

/// A remote tree the crawler can walk.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Obtain the session token attached to every subsequent fetch.
    async fn open_session(&self) -> Result<String, FetchError>;

    /// Fetch and decode a single node.
    async fn fetch_node(&self, id: &str, session: &str) -> Result<NodeDescriptor, FetchError>;
}
