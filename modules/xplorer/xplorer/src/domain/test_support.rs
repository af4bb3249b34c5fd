//! In-memory `NetworkApiClient` used by the domain tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use xplorer_sdk::{
    GeoLocation, HistorySnapshot, NetworkApiClient, RemoteNode, RemoteStats, XplorerError,
};

pub(crate) struct FakeApi {
    pages: Mutex<HashMap<u32, Result<Vec<RemoteNode>, XplorerError>>>,
    stats: Mutex<Result<RemoteStats, XplorerError>>,
    history: Mutex<Result<Vec<HistorySnapshot>, XplorerError>>,
    geo: Mutex<HashMap<String, GeoLocation>>,
    page_delay: Mutex<Option<Duration>>,
    node_calls: AtomicUsize,
    lookups: Mutex<Vec<(String, Instant)>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            stats: Mutex::new(Ok(RemoteStats::default())),
            history: Mutex::new(Ok(Vec::new())),
            geo: Mutex::new(HashMap::new()),
            page_delay: Mutex::new(None),
            node_calls: AtomicUsize::new(0),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_page(self, page: u32, nodes: Vec<RemoteNode>) -> Self {
        self.pages.lock().insert(page, Ok(nodes));
        self
    }

    pub(crate) fn with_failing_page(self, page: u32) -> Self {
        self.pages.lock().insert(
            page,
            Err(XplorerError::request_failed("/nodes", Some(500), "HTTP 500")),
        );
        self
    }

    pub(crate) fn with_stats(self, stats: RemoteStats) -> Self {
        *self.stats.lock() = Ok(stats);
        self
    }

    pub(crate) fn with_failing_stats(self) -> Self {
        *self.stats.lock() = Err(XplorerError::request_failed("/stats", Some(502), "HTTP 502"));
        self
    }

    pub(crate) fn with_history(self, history: Vec<HistorySnapshot>) -> Self {
        *self.history.lock() = Ok(history);
        self
    }

    pub(crate) fn with_failing_history(self) -> Self {
        *self.history.lock() =
            Err(XplorerError::request_failed("/history", Some(500), "HTTP 500"));
        self
    }

    pub(crate) fn with_geo(self, ip: &str, geo: GeoLocation) -> Self {
        self.geo.lock().insert(ip.to_owned(), geo);
        self
    }

    pub(crate) fn with_page_delay(self, delay: Duration) -> Self {
        *self.page_delay.lock() = Some(delay);
        self
    }

    pub(crate) fn set_stats_failing(&self) {
        *self.stats.lock() = Err(XplorerError::request_failed("/stats", Some(502), "HTTP 502"));
    }

    pub(crate) fn set_history_failing(&self) {
        *self.history.lock() =
            Err(XplorerError::request_failed("/history", Some(500), "HTTP 500"));
    }

    pub(crate) fn node_calls(&self) -> usize {
        self.node_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn lookups(&self) -> Vec<(String, Instant)> {
        self.lookups.lock().clone()
    }
}

#[async_trait]
impl NetworkApiClient for FakeApi {
    async fn fetch_nodes(&self, page: u32, _limit: u32) -> Result<Vec<RemoteNode>, XplorerError> {
        self.node_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.page_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .lock()
            .get(&page)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_stats(&self) -> Result<RemoteStats, XplorerError> {
        self.stats.lock().clone()
    }

    async fn fetch_history(&self) -> Result<Vec<HistorySnapshot>, XplorerError> {
        self.history.lock().clone()
    }

    async fn lookup_geo(&self, ip: &str) -> Result<GeoLocation, XplorerError> {
        self.lookups.lock().push((ip.to_owned(), Instant::now()));
        self.geo
            .lock()
            .get(ip)
            .cloned()
            .ok_or_else(|| XplorerError::geo_lookup_failed(ip, "fail"))
    }
}

pub(crate) fn remote(id: Option<&str>, address: &str) -> RemoteNode {
    RemoteNode {
        id: id.map(str::to_owned),
        ip_address: address.to_owned(),
        version: "0.7.1".to_owned(),
        status: "ONLINE".to_owned(),
        storage_committed_bytes: 1024,
        ..RemoteNode::default()
    }
}

pub(crate) fn remote_with_geo(id: &str, address: &str) -> RemoteNode {
    RemoteNode {
        lat: Some(40.71),
        lon: Some(-74.0),
        city: Some("New York".to_owned()),
        country: Some("US".to_owned()),
        ..remote(Some(id), address)
    }
}

pub(crate) fn geo(city: &str, cc: &str) -> GeoLocation {
    GeoLocation {
        lat: 10.0,
        lon: 20.0,
        city: city.to_owned(),
        country_code: cc.to_owned(),
    }
}
