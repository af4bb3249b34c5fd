//! Normalization of raw API records into explorer node records.

use xplorer_sdk::{
    GeoPoint, NetworkStats, NodeMetrics, NodeRecord, NodeStatus, PENDING_LOCATION, RemoteNode,
    RemoteStats,
};

use super::formatters::{format_storage, network_health, parse_timestamp};

/// Strip the port from a node address.
///
/// `1.2.3.4:6000` → `1.2.3.4`, `[::1]:6000` → `::1`. Addresses with more than
/// one colon and no brackets are bare IPv6 and returned unchanged.
#[must_use]
pub fn base_address(address: &str) -> &str {
    if let Some(rest) = address.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(host, _)| host);
    }

    match address.split_once(':') {
        Some((host, port)) if !port.contains(':') => host,
        _ => address,
    }
}

/// Coordinates supplied by the backend, if both are present and non-zero.
fn backend_geo(raw: &RemoteNode) -> Option<GeoPoint> {
    match (raw.lat, raw.lon) {
        (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(GeoPoint { lat, lng }),
        _ => None,
    }
}

fn backend_location(city: Option<&str>, country: Option<&str>) -> String {
    let city = city.filter(|c| !c.is_empty());
    let country = country.filter(|c| !c.is_empty());
    match (city, country) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (Some(part), None) | (None, Some(part)) => part.to_owned(),
        (None, None) => "Unknown".to_owned(),
    }
}

/// Turn one raw record into a node record.
///
/// `page` and `index` only matter for records without an id, which get the
/// synthetic id `node-{page}-{index}`. A node without backend coordinates
/// starts at [`PENDING_LOCATION`].
#[must_use]
pub fn normalize(raw: RemoteNode, page: u32, index: usize) -> NodeRecord {
    let geo = backend_geo(&raw);
    let location = if geo.is_some() {
        backend_location(raw.city.as_deref(), raw.country.as_deref())
    } else {
        PENDING_LOCATION.to_owned()
    };

    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("node-{page}-{index}"));
    let base = base_address(&raw.ip_address).to_owned();
    let last_seen = raw.last_seen.as_deref().and_then(parse_timestamp);
    if last_seen.is_none() && raw.last_seen.is_some() {
        tracing::debug!(node = %id, raw = ?raw.last_seen, "unparseable last_seen");
    }

    NodeRecord {
        id,
        base_address: base,
        version: raw.version,
        status: NodeStatus::from_source(&raw.status),
        source_status: raw.status,
        storage_committed_bytes: raw.storage_committed_bytes,
        formatted_storage: format_storage(raw.storage_committed_bytes),
        last_seen,
        geo,
        location,
        metrics: NodeMetrics {
            node_type: raw.node_type.unwrap_or_else(|| "Unknown".to_owned()),
            storage_used_bytes: raw.storage_used_bytes,
            cpu_percent: raw.cpu_percent,
            ram_used_bytes: raw.ram_used_bytes,
            ram_total_bytes: raw.ram_total_bytes,
            rpc_port: raw.rpc_port,
            packets_sent: raw.packets_sent,
            packets_received: raw.packets_received,
            uptime_seconds: raw.uptime_seconds,
        },
        full_address: raw.ip_address,
    }
}

/// Map raw counters into the display shape.
#[must_use]
pub fn summarize_stats(raw: RemoteStats) -> NetworkStats {
    NetworkStats {
        total_nodes: raw.total_nodes,
        online_nodes: raw.online_nodes,
        total_storage: format_storage(raw.total_storage_bytes),
        network_health: network_health(raw.online_nodes, raw.total_nodes),
    }
}
