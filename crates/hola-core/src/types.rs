use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder reported when a server type or version cannot be determined.
pub const UNKNOWN: &str = "Unknown";

/// A member node as listed by the registry.
///
/// Immutable once produced by [`RegistryClient::list_nodes`](crate::RegistryClient::list_nodes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Registry-assigned unique identifier (e.g. `urn:node:KNB`).
    pub identifier: String,
    /// Service root of the node (e.g. `https://knb.ecoinformatics.org/knb/d1/mn`).
    pub base_url: String,
    /// Human readable node name, when the registry supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Registry-reported node state (`up`, `down`, ...), when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl NodeRecord {
    /// Create a record with only the two required fields.
    pub fn new(identifier: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            base_url: base_url.into(),
            name: None,
            state: None,
        }
    }
}

/// Member nodes keyed by identifier, in registry feed order.
///
/// Inserting a duplicate identifier replaces the earlier record but keeps
/// its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: IndexMap<String, NodeRecord>,
}

impl NodeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, record: NodeRecord) -> Option<NodeRecord> {
        self.nodes.insert(record.identifier.clone(), record)
    }

    /// Look up a record by identifier.
    pub fn get(&self, identifier: &str) -> Option<&NodeRecord> {
        self.nodes.get(identifier)
    }

    /// Base URL registered for `identifier`.
    pub fn base_url(&self, identifier: &str) -> Option<&str> {
        self.get(identifier).map(|node| node.base_url.as_str())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the registry listed no member nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate records in feed order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }
}

impl FromIterator<NodeRecord> for NodeSet {
    fn from_iter<T: IntoIterator<Item = NodeRecord>>(iter: T) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl IntoIterator for NodeSet {
    type Item = NodeRecord;
    type IntoIter = indexmap::map::IntoValues<String, NodeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_values()
    }
}

/// Member node server implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServerType {
    /// Generic Member Node, identified by its `/home` status page.
    #[serde(rename = "GMN")]
    Gmn,
    /// Metacat, identified by its `getversion` action.
    Metacat,
    /// Neither probe succeeded.
    #[default]
    Unknown,
}

impl ServerType {
    /// Label used in output rows.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gmn => "GMN",
            Self::Metacat => "Metacat",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether any probe request got an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// At least one request was answered, whatever the status code.
    Up,
    /// Every attempted request failed at the transport level.
    Down,
}

impl NodeStatus {
    /// Label used in output rows.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of probing one node. Always exactly one per node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Detected server implementation.
    pub server_type: ServerType,
    /// Version string, [`UNKNOWN`] when it could not be extracted.
    pub version: String,
    /// Transport-level reachability.
    pub status: NodeStatus,
}

impl ProbeResult {
    /// Build a result, substituting [`UNKNOWN`] for a missing version.
    pub fn new(server_type: ServerType, version: Option<String>, status: NodeStatus) -> Self {
        Self {
            server_type,
            version: version.unwrap_or_else(|| UNKNOWN.to_string()),
            status,
        }
    }

    /// Neither probe identified the node.
    pub fn unknown(status: NodeStatus) -> Self {
        Self::new(ServerType::Unknown, None, status)
    }
}

/// One output row: a node and what probing found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    /// Registry identifier.
    #[serde(rename = "node_identifier")]
    pub identifier: String,
    /// Node service root.
    pub base_url: String,
    /// Detected server implementation.
    #[serde(rename = "mn_type")]
    pub server_type: ServerType,
    /// Detected version.
    #[serde(rename = "mn_version")]
    pub version: String,
    /// Reachability.
    #[serde(rename = "mn_status")]
    pub status: NodeStatus,
}

impl NodeReport {
    /// Combine a node with its probe outcome.
    pub fn new(node: &NodeRecord, result: ProbeResult) -> Self {
        Self {
            identifier: node.identifier.clone(),
            base_url: node.base_url.clone(),
            server_type: result.server_type,
            version: result.version,
            status: result.status,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_node_set_duplicate_overwrites_in_place() {
        let mut set = NodeSet::new();
        set.insert(NodeRecord::new("urn:node:A", "https://a.example.org/mn"));
        set.insert(NodeRecord::new("urn:node:B", "https://b.example.org/mn"));
        let replaced = set.insert(NodeRecord::new("urn:node:A", "https://a2.example.org/mn"));

        assert_eq!(
            replaced.map(|r| r.base_url),
            Some("https://a.example.org/mn".to_string())
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.base_url("urn:node:A"), Some("https://a2.example.org/mn"));
        let order: Vec<_> = set.iter().map(|n| n.identifier.as_str()).collect();
        assert_eq!(order, vec!["urn:node:A", "urn:node:B"]);
    }

    #[test]
    fn test_node_set_into_iter_keeps_feed_order() {
        let set: NodeSet = ["urn:node:C", "urn:node:A", "urn:node:B"]
            .into_iter()
            .map(|id| NodeRecord::new(id, "https://example.org"))
            .collect();

        let ids: Vec<_> = set.into_iter().map(|n| n.identifier).collect();
        assert_eq!(ids, vec!["urn:node:C", "urn:node:A", "urn:node:B"]);
    }

    #[test]
    fn test_probe_result_defaults_version_to_unknown() {
        let result = ProbeResult::new(ServerType::Gmn, None, NodeStatus::Up);
        assert_eq!(result.version, "Unknown");

        let result = ProbeResult::unknown(NodeStatus::Down);
        assert_eq!(result.server_type, ServerType::Unknown);
        assert_eq!(result.version, "Unknown");
    }

    #[test]
    fn test_labels() {
        assert_eq!(ServerType::Gmn.to_string(), "GMN");
        assert_eq!(ServerType::Metacat.to_string(), "Metacat");
        assert_eq!(ServerType::Unknown.to_string(), "Unknown");
        assert_eq!(NodeStatus::Up.to_string(), "up");
        assert_eq!(NodeStatus::Down.to_string(), "down");
    }

    #[test]
    fn test_report_serializes_with_column_names() {
        let node = NodeRecord::new("urn:node:KNB", "https://knb.example.org/knb/d1/mn");
        let report = NodeReport::new(
            &node,
            ProbeResult::new(ServerType::Metacat, Some("2.19.0".into()), NodeStatus::Up),
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["node_identifier"], "urn:node:KNB");
        assert_eq!(value["mn_type"], "Metacat");
        assert_eq!(value["mn_version"], "2.19.0");
        assert_eq!(value["mn_status"], "up");
    }
}
