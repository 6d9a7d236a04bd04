// Bounded-concurrency tree crawler — discovers nodes, fetches them in parallel, and
// collects every result under the parent that scheduled it.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::aggregation::{AggregationMap, CollectedEntry};
use super::reconstruct::reconstruct;
use super::stats::CrawlStats;
use crate::config::ROOT_KEY;
use crate::error::{CrawlError, FetchError};
use crate::source::descriptor::NodeDescriptor;
use crate::source::traits::NodeSource;

/// Lineage of one fetch, fixed when it is scheduled.
#[derive(Debug, Clone)]
struct ScheduledFetch {
    id: String,
    parent_id: String,
    order_index: usize,
    depth: i64,
}

enum Completed {
    Fetched(NodeDescriptor),
    Failed(FetchError),
    /// The unit of work ended (panicked) without producing a result.
    Abandoned,
}

struct FetchOutcome {
    job: ScheduledFetch,
    result: Completed,
}

/// Reporting handle owned by one unit of work. Every scheduled fetch yields
/// exactly one outcome: dropping the handle unsent reports `Abandoned`.
struct Completion {
    tx: mpsc::UnboundedSender<FetchOutcome>,
    job: Option<ScheduledFetch>,
}

impl Completion {
    fn new(tx: mpsc::UnboundedSender<FetchOutcome>, job: ScheduledFetch) -> Self {
        Self { tx, job: Some(job) }
    }

    fn send(mut self, result: Completed) {
        if let Some(job) = self.job.take() {
            // The receiver is gone only once the crawl has already returned.
            let _ = self.tx.send(FetchOutcome { job, result });
        }
    }

    /// Drop without reporting, used when the crawl itself was cancelled.
    fn discard(mut self) {
        self.job = None;
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(job) = self.job.take() {
            let _ = self.tx.send(FetchOutcome {
                job,
                result: Completed::Abandoned,
            });
        }
    }
}

pub struct Crawler {
    source: Arc<dyn NodeSource>,
    max_concurrency: usize,
    stats: Arc<CrawlStats>,
}

impl Crawler {
    pub fn new(source: Arc<dyn NodeSource>, max_concurrency: usize) -> Self {
        Self {
            source,
            max_concurrency: max_concurrency.max(1),
            stats: Arc::new(CrawlStats::new()),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Walk the whole tree below `root_id` and return the reassembled output.
    pub async fn crawl(&self, root_id: &str, session: &str) -> Result<String, CrawlError> {
        let map = self.collect(root_id, session).await?;
        Ok(reconstruct(map, ROOT_KEY))
    }

    /// Walk the whole tree below `root_id`, returning the raw aggregation.
    ///
    /// The first failure of any kind aborts the walk; outstanding fetches are
    /// cancelled and nothing collected so far is returned.
    pub async fn collect(&self, root_id: &str, session: &str) -> Result<AggregationMap, CrawlError> {
        self.stats.mark_start();

        let gate = Arc::new(Semaphore::new(self.max_concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
        let cancel = CancellationToken::new();
        // Whatever way this function returns, stragglers stop here.
        let _cancel_on_exit = cancel.clone().drop_guard();
        let session: Arc<str> = Arc::from(session);

        let mut map = AggregationMap::new();
        let mut in_flight: usize = 0;
        let mut first_result = true;

        in_flight += 1;
        self.spawn_fetch(
            ScheduledFetch {
                id: root_id.to_string(),
                parent_id: ROOT_KEY.to_string(),
                order_index: 0,
                depth: 0,
            },
            &gate,
            &tx,
            &cancel,
            &session,
        );

        while in_flight > 0 {
            let Some(FetchOutcome { job, result }) = rx.recv().await else {
                return Err(CrawlError::Interrupted {
                    reason: "completion queue closed".to_string(),
                });
            };

            let node = match result {
                Completed::Fetched(node) => node,
                Completed::Failed(source) => {
                    warn!("crawl aborted: fetch of {:?} failed: {}", job.id, source);
                    return Err(CrawlError::Fetch { id: job.id, source });
                }
                Completed::Abandoned => {
                    return Err(CrawlError::Interrupted {
                        reason: format!("fetch of {:?} ended without a result", job.id),
                    });
                }
            };

            if node.has_message() {
                if !first_result {
                    return Err(CrawlError::Protocol {
                        id: job.id,
                        message: node.message,
                    });
                }
                info!("root message: {}", node.message);
            }
            first_result = false;

            if node.depth != job.depth {
                warn!(
                    "node {:?} reports depth {} but was reached at depth {}",
                    job.id, node.depth, job.depth
                );
            }

            let is_leaf = node.is_leaf();
            map.record(
                &job.parent_id,
                CollectedEntry {
                    child_id: job.id.clone(),
                    fragment: node.secret,
                    order_index: job.order_index,
                },
            );

            if is_leaf {
                self.stats.record_fragment();
                if !node.next.is_empty() {
                    debug!(
                        "node {:?} carries a fragment, ignoring {} listed children",
                        job.id,
                        node.next.len()
                    );
                }
            } else {
                for (order_index, child_id) in node.next.into_iter().enumerate() {
                    in_flight += 1;
                    self.spawn_fetch(
                        ScheduledFetch {
                            id: child_id,
                            parent_id: job.id.clone(),
                            order_index,
                            depth: job.depth + 1,
                        },
                        &gate,
                        &tx,
                        &cancel,
                        &session,
                    );
                }
            }

            in_flight -= 1;
        }

        let snap = self.stats.snapshot();
        info!(
            "crawl finished: nodes={} fragments={} peak_fetches={} elapsed={:?}",
            map.len(),
            snap.fragments,
            snap.peak_active_fetches,
            snap.elapsed
        );
        Ok(map)
    }

    fn spawn_fetch(
        &self,
        job: ScheduledFetch,
        gate: &Arc<Semaphore>,
        tx: &mpsc::UnboundedSender<FetchOutcome>,
        cancel: &CancellationToken,
        session: &Arc<str>,
    ) {
        let source = Arc::clone(&self.source);
        let stats = Arc::clone(&self.stats);
        let gate = Arc::clone(gate);
        let cancel = cancel.clone();
        let session = Arc::clone(session);
        let id = job.id.clone();
        let completion = Completion::new(tx.clone(), job);

        tokio::spawn(async move {
            let result = tokio::select! {
                result = Self::fetch_task(source, stats, gate, &id, &session) => result,
                _ = cancel.cancelled() => {
                    debug!("fetch {:?} cancelled", id);
                    completion.discard();
                    return;
                }
            };
            completion.send(result);
        });
    }

    async fn fetch_task(
        source: Arc<dyn NodeSource>,
        stats: Arc<CrawlStats>,
        gate: Arc<Semaphore>,
        id: &str,
        session: &str,
    ) -> Completed {
        let permit = match gate.acquire().await {
            Ok(permit) => permit,
            Err(e) => return Completed::Failed(FetchError::Other(anyhow!("admission gate closed: {}", e))),
        };

        let active = stats.begin_fetch();
        debug!("fetch {:?} admitted", id);
        let result = source.fetch_node(id, session).await;
        drop(active);
        drop(permit);

        match result {
            Ok(node) => Completed::Fetched(node),
            Err(e) => Completed::Failed(e),
        }
    }
}
