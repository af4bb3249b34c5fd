use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use xplorer_sdk::{GeoLocation, NodeRecord};

/// Node collection shared by the aggregator and the enrichment worker.
///
/// Locks are never held across an `.await`.
pub type SharedNodes = Arc<RwLock<NodeCollection>>;

/// How much of the loaded network has coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeoCoverage {
    pub total: usize,
    pub resolved: usize,
    /// Some loaded node is still waiting for coordinates.
    pub scanning: bool,
}

/// Insertion-ordered nodes with unique identities.
///
/// The collection only grows; enrichment rewrites geo fields in place.
#[derive(Debug, Default)]
pub struct NodeCollection {
    nodes: Vec<NodeRecord>,
    ids: HashSet<String>,
}

impl NodeCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> SharedNodes {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Append every node whose id is not already present. Returns how many were added.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = NodeRecord>) -> usize {
        let before = self.nodes.len();
        for node in batch {
            if self.ids.insert(node.id.clone()) {
                self.nodes.push(node);
            }
        }
        self.nodes.len() - before
    }

    /// Set coordinates and location on every node behind `base_address`.
    /// Returns how many nodes were updated.
    pub fn apply_geo(&mut self, base_address: &str, geo: &GeoLocation) -> usize {
        let point = geo.point();
        let label = geo.location_label();
        let mut updated = 0;
        for node in self
            .nodes
            .iter_mut()
            .filter(|n| n.base_address == base_address)
        {
            node.geo = Some(point);
            node.location.clone_from(&label);
            updated += 1;
        }
        updated
    }

    /// Give unresolved nodes behind `base_address` the location of an
    /// already resolved node with the same base address. Returns how many
    /// nodes were updated.
    pub fn copy_known_geo(&mut self, base_address: &str) -> usize {
        let Some((point, label)) = self
            .nodes
            .iter()
            .filter(|n| n.base_address == base_address && !n.is_pending())
            .find_map(|n| n.geo.map(|point| (point, n.location.clone())))
        else {
            return 0;
        };

        let mut updated = 0;
        for node in self
            .nodes
            .iter_mut()
            .filter(|n| n.base_address == base_address && !n.is_resolved())
        {
            node.geo = Some(point);
            node.location.clone_from(&label);
            updated += 1;
        }
        updated
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<NodeRecord> {
        self.nodes.clone()
    }

    /// Nodes whose full address contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<NodeRecord> {
        let needle = query.to_lowercase();
        self.nodes
            .iter()
            .filter(|n| n.full_address.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Look a node up by id, then by full address.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<NodeRecord> {
        self.nodes
            .iter()
            .find(|n| n.id == key)
            .or_else(|| self.nodes.iter().find(|n| n.full_address == key))
            .cloned()
    }

    #[must_use]
    pub fn coverage(&self) -> GeoCoverage {
        let resolved = self.nodes.iter().filter(|n| n.is_resolved()).count();
        GeoCoverage {
            total: self.nodes.len(),
            resolved,
            scanning: resolved < self.nodes.len(),
        }
    }
}
