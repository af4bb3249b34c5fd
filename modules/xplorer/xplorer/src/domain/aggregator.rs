//! Network data aggregator.
//!
//! Owns the node collection, the network-wide snapshots and the page cursor,
//! and feeds nodes without coordinates to the enrichment queue. Every
//! operation is best-effort: failures are logged, reported through the
//! returned outcome, and leave previously loaded data in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use xplorer_sdk::{HistorySnapshot, NetworkApiClient, NetworkStats, NodeRecord, XplorerError};

use super::collection::{GeoCoverage, NodeCollection, SharedNodes};
use super::enrichment::EnrichmentQueue;
use super::geo_cache::GeoCache;
use super::node::{normalize, summarize_stats};
use crate::config::{EnrichmentConfig, XplorerConfig};

/// Aggregator settings derived from [`XplorerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub page_size: u32,
    pub enrichment: EnrichmentConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::from(&XplorerConfig::default())
    }
}

impl From<&XplorerConfig> for AggregatorConfig {
    fn from(cfg: &XplorerConfig) -> Self {
        Self {
            page_size: cfg.page_size,
            enrichment: cfg.enrichment,
        }
    }
}

/// Result of fetching one page of nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Appended {
        page: u32,
        received: usize,
        added: usize,
        scheduled: usize,
    },
    /// The page was empty; no further pages will be requested.
    Exhausted { page: u32 },
    /// The collection is unchanged.
    Failed { page: u32, error: XplorerError },
}

/// Result of refreshing stats and history together.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalOutcome {
    Refreshed { history_points: usize },
    /// Both snapshots kept their previous values.
    Failed { error: XplorerError },
}

#[derive(Debug)]
struct Cursor {
    page: u32,
    has_more: bool,
    loading: bool,
}

/// Clears the loading flag on every exit path, including cancellation.
struct LoadingGuard<'a> {
    cursor: &'a Mutex<Cursor>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.cursor.lock().loading = false;
    }
}

/// Incremental loader and state holder for the explorer views.
pub struct NetworkDataAggregator {
    api: Arc<dyn NetworkApiClient>,
    nodes: SharedNodes,
    stats: RwLock<NetworkStats>,
    history: RwLock<Vec<HistorySnapshot>>,
    cursor: Mutex<Cursor>,
    activated: AtomicBool,
    enrichment: EnrichmentQueue,
    page_size: u32,
}

impl std::fmt::Debug for NetworkDataAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkDataAggregator")
            .field("nodes", &self.nodes.read().len())
            .field("cursor", &*self.cursor.lock())
            .field("page_size", &self.page_size)
            .field("enrichment", &self.enrichment)
            .finish_non_exhaustive()
    }
}

impl NetworkDataAggregator {
    #[must_use]
    pub fn new(
        api: Arc<dyn NetworkApiClient>,
        cache: Arc<dyn GeoCache>,
        config: AggregatorConfig,
    ) -> Self {
        let nodes = NodeCollection::shared();
        let enrichment =
            EnrichmentQueue::new(Arc::clone(&api), cache, Arc::clone(&nodes), config.enrichment);
        Self {
            api,
            nodes,
            stats: RwLock::new(NetworkStats::default()),
            history: RwLock::new(Vec::new()),
            // Loading until the first page lands.
            cursor: Mutex::new(Cursor {
                page: 1,
                has_more: true,
                loading: true,
            }),
            activated: AtomicBool::new(false),
            enrichment,
            page_size: config.page_size,
        }
    }

    /// Load the first page and the global snapshots concurrently.
    ///
    /// Only the first call does anything; later calls return `None`.
    pub async fn activate(&self) -> Option<(PageOutcome, GlobalOutcome)> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return None;
        }
        tracing::info!(page_size = self.page_size, "activating network data aggregator");
        Some(tokio::join!(self.fetch_page(1), self.refresh_global()))
    }

    /// Fetch page `page` and merge it into the collection.
    pub async fn fetch_page(&self, page: u32) -> PageOutcome {
        self.cursor.lock().loading = true;
        let _guard = LoadingGuard {
            cursor: &self.cursor,
        };

        let batch = match self.api.fetch_nodes(page, self.page_size).await {
            Ok(batch) => batch,
            Err(error) => {
                tracing::warn!(page, error = %error, "failed to fetch nodes");
                return PageOutcome::Failed { page, error };
            }
        };

        if batch.is_empty() {
            self.cursor.lock().has_more = false;
            tracing::debug!(page, "no more nodes");
            return PageOutcome::Exhausted { page };
        }

        let received = batch.len();
        let normalized: Vec<NodeRecord> = batch
            .into_iter()
            .enumerate()
            .map(|(index, raw)| normalize(raw, page, index))
            .collect();
        let unresolved: Vec<String> = normalized
            .iter()
            .filter(|n| !n.is_resolved() && !n.base_address.is_empty())
            .map(|n| n.base_address.clone())
            .collect();

        // Merge first so the worker always finds the nodes it resolves.
        let added = self.nodes.write().merge(normalized);
        let mut scheduled = 0;
        let mut backfilled = 0;
        for address in &unresolved {
            if self.enrichment.enqueue(address) {
                scheduled += 1;
            } else {
                backfilled += self.enrichment.backfill(address);
            }
        }

        tracing::debug!(page, received, added, scheduled, backfilled, "nodes page merged");
        PageOutcome::Appended {
            page,
            received,
            added,
            scheduled,
        }
    }

    /// Fetch the next page unless a load is in flight or pages are exhausted.
    pub async fn load_more(&self) -> Option<PageOutcome> {
        let next = {
            let mut cursor = self.cursor.lock();
            if cursor.loading || !cursor.has_more {
                return None;
            }
            cursor.loading = true;
            cursor.page += 1;
            cursor.page
        };
        Some(self.fetch_page(next).await)
    }

    /// Refresh stats and history; both are replaced only if both succeed.
    pub async fn refresh_global(&self) -> GlobalOutcome {
        match tokio::try_join!(self.api.fetch_stats(), self.api.fetch_history()) {
            Ok((stats, history)) => {
                let history_points = history.len();
                *self.stats.write() = summarize_stats(stats);
                *self.history.write() = history;
                tracing::debug!(history_points, "global stats refreshed");
                GlobalOutcome::Refreshed { history_points }
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to refresh global stats");
                GlobalOutcome::Failed { error }
            }
        }
    }

    #[must_use]
    pub fn nodes(&self) -> Vec<NodeRecord> {
        self.nodes.read().snapshot()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    #[must_use]
    pub fn stats(&self) -> NetworkStats {
        self.stats.read().clone()
    }

    #[must_use]
    pub fn history(&self) -> Vec<HistorySnapshot> {
        self.history.read().clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.cursor.lock().loading
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor.lock().has_more
    }

    /// Last page requested.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.cursor.lock().page
    }

    #[must_use]
    pub fn enrichment(&self) -> &EnrichmentQueue {
        &self.enrichment
    }

    /// Loaded nodes whose address contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<NodeRecord> {
        self.nodes.read().search(query)
    }

    /// A loaded node by id or full address.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<NodeRecord> {
        self.nodes.read().find(key)
    }

    #[must_use]
    pub fn geo_coverage(&self) -> GeoCoverage {
        self.nodes.read().coverage()
    }
}
