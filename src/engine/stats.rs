// Live crawl counters — fetch progress, active fetches, fragments found.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub struct CrawlStatsSnapshot {
    pub fetches_started: u64,
    pub fetches_completed: u64,
    pub active_fetches: u32,
    pub peak_active_fetches: u32,
    pub fragments: u64,
    pub elapsed: Duration,
}

pub struct CrawlStats {
    fetches_started: AtomicU64,
    fetches_completed: AtomicU64,
    active_fetches: AtomicU32,
    peak_active_fetches: AtomicU32,
    fragments: AtomicU64,
    started_at: Mutex<Instant>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            fetches_started: AtomicU64::new(0),
            fetches_completed: AtomicU64::new(0),
            active_fetches: AtomicU32::new(0),
            peak_active_fetches: AtomicU32::new(0),
            fragments: AtomicU64::new(0),
            started_at: Mutex::new(Instant::now()),
        }
    }

    /// Reset the per-run counters and the elapsed clock at the start of a crawl.
    /// `active_fetches` is left alone: stragglers of an earlier run still
    /// release their slot, and the peak restarts from whatever is still active.
    pub fn mark_start(&self) {
        self.fetches_started.store(0, Ordering::Relaxed);
        self.fetches_completed.store(0, Ordering::Relaxed);
        self.fragments.store(0, Ordering::Relaxed);
        let active = self.active_fetches.load(Ordering::SeqCst);
        self.peak_active_fetches.store(active, Ordering::SeqCst);
        *self.started_at.lock() = Instant::now();
    }

    /// A unit of work was admitted and is about to hit the network. The
    /// returned guard marks it finished when dropped, including when the
    /// fetch is cancelled or unwinds.
    pub fn begin_fetch(&self) -> ActiveFetch<'_> {
        self.fetch_started();
        ActiveFetch { stats: self }
    }

    fn fetch_started(&self) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
        let active = self.active_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active_fetches.fetch_max(active, Ordering::SeqCst);
    }

    fn fetch_finished(&self) {
        self.fetches_completed.fetch_add(1, Ordering::Relaxed);
        self.active_fetches.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn record_fragment(&self) {
        self.fragments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CrawlStatsSnapshot {
        CrawlStatsSnapshot {
            fetches_started: self.fetches_started.load(Ordering::Relaxed),
            fetches_completed: self.fetches_completed.load(Ordering::Relaxed),
            active_fetches: self.active_fetches.load(Ordering::SeqCst),
            peak_active_fetches: self.peak_active_fetches.load(Ordering::SeqCst),
            fragments: self.fragments.load(Ordering::Relaxed),
            elapsed: self.started_at.lock().elapsed(),
        }
    }
}

pub struct ActiveFetch<'a> {
    stats: &'a CrawlStats,
}

impl Drop for ActiveFetch<'_> {
    fn drop(&mut self) {
        self.stats.fetch_finished();
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}
