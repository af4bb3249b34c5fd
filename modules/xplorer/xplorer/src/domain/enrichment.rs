//! Throttled geo-enrichment of nodes without coordinates.
//!
//! Base addresses are resolved one at a time in FIFO order, from the geo cache
//! when possible and from the provider otherwise. A single worker task drains
//! the queue and goes back to [`WorkerState::Idle`] once it is empty; the next
//! enqueue wakes a fresh worker.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::Instrument;
use xplorer_sdk::{GeoLocation, NetworkApiClient, XplorerError};

use super::collection::SharedNodes;
use super::geo_cache::{GeoCache, read_entry, write_entry};
use crate::config::EnrichmentConfig;

const EVENTS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Draining,
}

/// Result of resolving one base address.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    CacheHit {
        address: String,
        location: GeoLocation,
        updated: usize,
    },
    Resolved {
        address: String,
        location: GeoLocation,
        updated: usize,
    },
    /// The node keeps the pending sentinel; the address is not retried.
    LookupFailed {
        address: String,
        error: XplorerError,
    },
}

impl EnrichmentOutcome {
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::CacheHit { address, .. }
            | Self::Resolved { address, .. }
            | Self::LookupFailed { address, .. } => address,
        }
    }
}

struct QueueState {
    pending: VecDeque<String>,
    scheduled: HashSet<String>,
    worker: WorkerState,
}

struct Shared {
    api: Arc<dyn NetworkApiClient>,
    cache: Arc<dyn GeoCache>,
    nodes: SharedNodes,
    config: EnrichmentConfig,
    queue: Mutex<QueueState>,
    state_tx: watch::Sender<WorkerState>,
    events: broadcast::Sender<EnrichmentOutcome>,
}

/// FIFO queue of base addresses awaiting geolocation.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct EnrichmentQueue {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for EnrichmentQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.shared.queue.lock();
        f.debug_struct("EnrichmentQueue")
            .field("worker", &queue.worker)
            .field("pending", &queue.pending.len())
            .field("scheduled", &queue.scheduled.len())
            .finish_non_exhaustive()
    }
}

impl EnrichmentQueue {
    #[must_use]
    pub fn new(
        api: Arc<dyn NetworkApiClient>,
        cache: Arc<dyn GeoCache>,
        nodes: SharedNodes,
        config: EnrichmentConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkerState::Idle);
        let (events, _) = broadcast::channel(EVENTS_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                api,
                cache,
                nodes,
                config,
                queue: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    scheduled: HashSet::new(),
                    worker: WorkerState::Idle,
                }),
                state_tx,
                events,
            }),
        }
    }

    /// Schedule `base_address` for resolution.
    ///
    /// Returns `false` if the address was already scheduled during this
    /// session. Starts a worker when none is running; must be called from
    /// within a Tokio runtime.
    pub fn enqueue(&self, base_address: &str) -> bool {
        let mut queue = self.shared.queue.lock();
        if !queue.scheduled.insert(base_address.to_owned()) {
            return false;
        }
        queue.pending.push_back(base_address.to_owned());

        if queue.worker == WorkerState::Idle {
            queue.worker = WorkerState::Draining;
            self.shared.state_tx.send_replace(WorkerState::Draining);
            tracing::debug!("geo enrichment worker started");
            tokio::spawn(run_worker(Arc::clone(&self.shared)).in_current_span());
        }
        true
    }

    /// Give late-arriving nodes of an already scheduled `base_address` the
    /// location known so far, from a resolved sibling node or from the cache.
    ///
    /// Returns how many nodes were updated. Nodes of an address still
    /// waiting in the queue are picked up by the worker instead.
    pub fn backfill(&self, base_address: &str) -> usize {
        let copied = self.shared.nodes.write().copy_known_geo(base_address);
        if copied > 0 {
            return copied;
        }

        match read_entry(self.shared.cache.as_ref(), base_address) {
            Ok(Some(location)) => self.shared.nodes.write().apply_geo(base_address, &location),
            Ok(None) => 0,
            Err(error) => {
                tracing::error!(base_address, error = %error, "geo cache read failed during backfill");
                0
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.shared.queue.lock().worker
    }

    /// Addresses waiting behind the one being resolved.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().pending.len()
    }

    /// Addresses ever accepted by [`Self::enqueue`].
    #[must_use]
    pub fn scheduled_count(&self) -> usize {
        self.shared.queue.lock().scheduled.len()
    }

    /// Receive an [`EnrichmentOutcome`] for every processed address.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EnrichmentOutcome> {
        self.shared.events.subscribe()
    }

    /// Wait until the queue is drained and the worker has stopped.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.state_tx.subscribe();
        // The sender lives in `shared`, so the channel cannot close under us.
        let _ = rx.wait_for(|state| *state == WorkerState::Idle).await;
    }
}

async fn run_worker(shared: Arc<Shared>) {
    loop {
        let next = {
            let mut queue = shared.queue.lock();
            if let Some(address) = queue.pending.pop_front() {
                address
            } else {
                queue.worker = WorkerState::Idle;
                shared.state_tx.send_replace(WorkerState::Idle);
                tracing::debug!("geo enrichment queue drained");
                return;
            }
        };

        let (outcome, delay) = shared.resolve(next).await;
        log_outcome(&outcome);
        // No subscribers is fine.
        let _ = shared.events.send(outcome);

        tokio::time::sleep(delay).await;
    }
}

impl Shared {
    async fn resolve(&self, address: String) -> (EnrichmentOutcome, Duration) {
        match read_entry(self.cache.as_ref(), &address) {
            Ok(Some(location)) => {
                let updated = self.nodes.write().apply_geo(&address, &location);
                return (
                    EnrichmentOutcome::CacheHit {
                        address,
                        location,
                        updated,
                    },
                    self.config.cache_hit_delay,
                );
            }
            Ok(None) => {}
            Err(error) => {
                tracing::error!(base_address = %address, error = %error, "geo cache read failed, falling back to lookup");
            }
        }

        let outcome = match self.api.lookup_geo(&address).await {
            Ok(location) => {
                write_entry(self.cache.as_ref(), &address, &location);
                let updated = self.nodes.write().apply_geo(&address, &location);
                EnrichmentOutcome::Resolved {
                    address,
                    location,
                    updated,
                }
            }
            Err(error) => EnrichmentOutcome::LookupFailed { address, error },
        };
        (outcome, self.config.lookup_delay)
    }
}

fn log_outcome(outcome: &EnrichmentOutcome) {
    match outcome {
        EnrichmentOutcome::CacheHit {
            address, updated, ..
        } => {
            tracing::debug!(base_address = %address, updated, "geo served from cache");
        }
        EnrichmentOutcome::Resolved {
            address,
            location,
            updated,
        } => {
            tracing::debug!(
                base_address = %address,
                location = %location.location_label(),
                updated,
                "geo resolved"
            );
        }
        EnrichmentOutcome::LookupFailed { address, error } => {
            tracing::warn!(base_address = %address, error = %error, "geo lookup failed");
        }
    }
}
