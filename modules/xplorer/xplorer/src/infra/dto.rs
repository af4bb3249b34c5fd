//! Wire formats of the telemetry API and the geolocation provider.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use xplorer_sdk::{GeoLocation, HistorySnapshot, RemoteNode, RemoteStats};

/// One element of the `GET /nodes` array.
///
/// Every field is optional on the wire; absent or `null` numbers read as zero.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeDto {
    #[serde(deserialize_with = "id_string")]
    pub id: Option<String>,
    pub ip_address: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
    pub node_type: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub storage_committed_bytes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub storage_used_bytes: u64,
    pub last_seen: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub cpu_percent: Option<f64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub ram_used_bytes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub ram_total_bytes: u64,
    pub rpc_port: Option<u16>,
    #[serde(deserialize_with = "lenient_u64")]
    pub packets_sent: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub packets_received: u64,
    pub uptime_seconds: Option<i64>,
}

impl From<NodeDto> for RemoteNode {
    fn from(dto: NodeDto) -> Self {
        Self {
            id: dto.id,
            ip_address: dto.ip_address.unwrap_or_default(),
            version: dto.version.unwrap_or_default(),
            status: dto.status.unwrap_or_default(),
            node_type: dto.node_type,
            storage_committed_bytes: dto.storage_committed_bytes,
            storage_used_bytes: dto.storage_used_bytes,
            last_seen: dto.last_seen,
            lat: dto.lat,
            lon: dto.lon,
            city: dto.city,
            country: dto.country,
            cpu_percent: dto.cpu_percent.unwrap_or_default(),
            ram_used_bytes: dto.ram_used_bytes,
            ram_total_bytes: dto.ram_total_bytes,
            rpc_port: dto.rpc_port,
            packets_sent: dto.packets_sent,
            packets_received: dto.packets_received,
            uptime_seconds: dto.uptime_seconds.unwrap_or_default(),
        }
    }
}

/// Decode a `/nodes` body.
///
/// Anything but a JSON array is an empty page. Elements that are not node
/// objects, or that carry no address, are skipped.
#[must_use]
pub fn decode_nodes(body: Value) -> Vec<RemoteNode> {
    let Value::Array(items) = body else {
        tracing::debug!("nodes response is not an array, treating as empty page");
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match NodeDto::deserialize(item) {
            Ok(dto) if dto.ip_address.as_deref().is_some_and(|a| !a.trim().is_empty()) => {
                Some(RemoteNode::from(dto))
            }
            Ok(_) => {
                tracing::warn!(index, "skipping node record without ip_address");
                None
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed node record");
                None
            }
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatsDto {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_nodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub online_nodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_storage_bytes: u64,
}

impl From<StatsDto> for RemoteStats {
    fn from(dto: StatsDto) -> Self {
        Self {
            total_nodes: dto.total_nodes,
            online_nodes: dto.online_nodes,
            total_storage_bytes: dto.total_storage_bytes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryDto {
    #[serde(deserialize_with = "timestamp_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_nodes: u64,
    #[serde(default)]
    pub active_nodes: Option<u64>,
    #[serde(default)]
    pub online_nodes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_storage_committed: u64,
}

impl From<HistoryDto> for HistorySnapshot {
    fn from(dto: HistoryDto) -> Self {
        Self {
            timestamp: dto.timestamp,
            total_nodes: dto.total_nodes,
            // Newer rows call it `active_nodes`; that name wins when both appear.
            online_nodes: dto.active_nodes.or(dto.online_nodes),
            total_storage_committed: dto.total_storage_committed,
        }
    }
}

/// `GET /json/{ip}` answer. Only `status == "success"` carries a location.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoDto {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl GeoDto {
    /// The location, or the reason there is none.
    ///
    /// # Errors
    /// Returns the provider's message when the status is not `success` or
    /// the coordinates are missing.
    pub fn into_location(self) -> Result<GeoLocation, String> {
        if self.status != "success" {
            return Err(self
                .message
                .unwrap_or_else(|| format!("provider status '{}'", self.status)));
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(GeoLocation {
                lat,
                lon,
                city: self.city.unwrap_or_default(),
                country_code: self.country_code.unwrap_or_default(),
            }),
            _ => Err("success response without coordinates".to_owned()),
        }
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(float_to_u64))
            .unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_u64(value: f64) -> u64 {
    value.round() as u64
}

fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn timestamp_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
