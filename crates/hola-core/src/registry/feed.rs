//! Parsing of the registry node list document.
//!
//! ## Schema contract
//!
//! The registry answers `GET /cn/v2/node` with a document of this shape
//! (namespace prefixes vary and are ignored):
//!
//! ```xml
//! <ns2:nodeList xmlns:ns2="http://ns.dataone.org/service/types/v2.0">
//!   <node replicate="false" synchronize="true" type="mn" state="up">
//!     <identifier>urn:node:KNB</identifier>
//!     <name>KNB Data Repository</name>
//!     <description>...</description>
//!     <baseURL>https://knb.ecoinformatics.org/knb/d1/mn</baseURL>
//!     <services>...</services>
//!   </node>
//!   <node type="cn" ...>...</node>
//! </ns2:nodeList>
//! ```
//!
//! Only `<node>` elements that are direct children of the root and carry
//! `type="mn"` are kept. Fields are matched by element name among the node's
//! direct children:
//!
//! | element / attribute | field |
//! |---------------------|-------|
//! | `<identifier>` | [`NodeRecord::identifier`] (required) |
//! | `<baseURL>` | [`NodeRecord::base_url`] (required) |
//! | `<name>` | [`NodeRecord::name`] |
//! | `state="..."` | [`NodeRecord::state`] |
//!
//! Child order does not matter. A member node without one of the required
//! fields breaks the contract and fails the whole document.

use crate::types::{NodeRecord, NodeSet};
use crate::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::instrument;

/// `type` attribute value marking a member node.
pub const MEMBER_NODE_TYPE: &str = "mn";

const NODE_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Identifier,
    BaseUrl,
    Name,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"identifier" => Some(Self::Identifier),
            b"baseURL" => Some(Self::BaseUrl),
            b"name" => Some(Self::Name),
            _ => None,
        }
    }
}

/// A `<node>` element being read.
#[derive(Debug, Default)]
struct PendingNode {
    node_type: Option<String>,
    state: Option<String>,
    identifier: Option<String>,
    base_url: Option<String>,
    name: Option<String>,
}

impl PendingNode {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        Ok(Self {
            node_type: attribute(start, "type")?,
            state: attribute(start, "state")?,
            ..Self::default()
        })
    }

    fn is_member_node(&self) -> bool {
        self.node_type.as_deref() == Some(MEMBER_NODE_TYPE)
    }

    fn set(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Identifier => &mut self.identifier,
            Field::BaseUrl => &mut self.base_url,
            Field::Name => &mut self.name,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    /// Finish the node. `Ok(None)` for nodes that are not member nodes.
    fn finish(self, position: usize) -> Result<Option<NodeRecord>> {
        if !self.is_member_node() {
            return Ok(None);
        }

        let identifier = non_empty(self.identifier).ok_or_else(|| {
            Error::Schema(format!("member node #{position} has no <identifier>"))
        })?;
        let base_url = non_empty(self.base_url).ok_or_else(|| {
            Error::Schema(format!("member node {identifier} has no <baseURL>"))
        })?;

        Ok(Some(NodeRecord {
            identifier,
            base_url,
            name: non_empty(self.name),
            state: self.state,
        }))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn attribute(start: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    let attr = start
        .try_get_attribute(key)
        .map_err(|e| Error::Parse(format!("Invalid attribute on <node>: {e}")))?;
    attr.map(|a| {
        a.unescape_value()
            .map(|v| v.into_owned())
            .map_err(|e| Error::Parse(format!("Invalid attribute value for {key}: {e}")))
    })
    .transpose()
}

/// Parse a registry node list into the member nodes it declares.
///
/// # Errors
///
/// Returns [`Error::Parse`] for documents the strict XML reader rejects
/// (including empty bodies and unclosed elements) and [`Error::Schema`] for a
/// member node missing a required field.
///
/// # Examples
///
/// ```
/// use hola_core::registry::parse_node_list;
///
/// let xml = r#"<nodeList>
///   <node type="mn"><identifier>urn:node:A</identifier><baseURL>https://a.org/mn</baseURL></node>
///   <node type="cn"><identifier>urn:node:CN</identifier><baseURL>https://cn.org/cn</baseURL></node>
/// </nodeList>"#;
///
/// let nodes = parse_node_list(xml).unwrap();
/// assert_eq!(nodes.len(), 1);
/// assert_eq!(nodes.base_url("urn:node:A"), Some("https://a.org/mn"));
/// ```
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_node_list(xml: &str) -> Result<NodeSet> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut nodes = NodeSet::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut seen_nodes = 0usize;
    let mut pending: Option<PendingNode> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    if saw_root {
                        return Err(Error::Parse("multiple root elements".into()));
                    }
                    saw_root = true;
                } else if depth == NODE_DEPTH && e.local_name().as_ref() == b"node" {
                    seen_nodes += 1;
                    pending = Some(PendingNode::from_start(&e)?);
                } else if depth == FIELD_DEPTH && pending.is_some() {
                    field = Field::from_local_name(e.local_name().as_ref());
                } else {
                    field = None;
                }
            },
            Event::Empty(e) => {
                if depth == 0 {
                    if saw_root {
                        return Err(Error::Parse("multiple root elements".into()));
                    }
                    saw_root = true;
                } else if depth + 1 == NODE_DEPTH && e.local_name().as_ref() == b"node" {
                    seen_nodes += 1;
                    if let Some(record) = PendingNode::from_start(&e)?.finish(seen_nodes)? {
                        nodes.insert(record);
                    }
                }
            },
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Parse(format!("Invalid text: {e}")))?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(Error::Parse("text outside of the root element".into()));
                    }
                } else if let (Some(node), Some(f)) = (pending.as_mut(), field) {
                    if depth == FIELD_DEPTH {
                        node.set(f, &text);
                    }
                }
            },
            Event::CData(e) => {
                if let (Some(node), Some(f)) = (pending.as_mut(), field) {
                    if depth == FIELD_DEPTH {
                        node.set(f, &String::from_utf8_lossy(&e));
                    }
                }
            },
            Event::End(e) => {
                if depth == FIELD_DEPTH {
                    field = None;
                } else if depth == NODE_DEPTH && e.local_name().as_ref() == b"node" {
                    if let Some(node) = pending.take() {
                        if let Some(record) = node.finish(seen_nodes)? {
                            nodes.insert(record);
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    if !saw_root {
        return Err(Error::Parse("document has no root element".into()));
    }
    if depth != 0 {
        return Err(Error::Parse("unexpected end of document".into()));
    }

    tracing::debug!(nodes = seen_nodes, member_nodes = nodes.len(), "Parsed node list");
    Ok(nodes)
}
