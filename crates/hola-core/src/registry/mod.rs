//! Registry client: operating domain validation and member node listing.
//!
//! ```no_run
//! use hola_core::{RegistryClient, TracingErrorSink};
//! use hola_core::config::HttpConfig;
//! use hola_core::http::build_client;
//! use std::sync::Arc;
//!
//! # async fn example() -> hola_core::Result<()> {
//! let client = build_client(&HttpConfig::default())?;
//! let registry = RegistryClient::new(client, Arc::new(TracingErrorSink));
//!
//! if registry.validate("cn.dataone.org").await {
//!     let nodes = registry.list_nodes("cn.dataone.org").await?;
//!     println!("{} member nodes", nodes.len());
//! }
//! # Ok(())
//! # }
//! ```

mod feed;

pub use feed::{MEMBER_NODE_TYPE, parse_node_list};

use crate::http::registry_url;
use crate::sink::ErrorSink;
use crate::types::NodeSet;
use crate::{Error, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Registry API root, used for the reachability check.
pub const REGISTRY_API_PATH: &str = "/cn/v2";
/// Node listing endpoint.
pub const NODE_LIST_PATH: &str = "/cn/v2/node";

/// Client for one registry's coordinating node API.
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    sink: Arc<dyn ErrorSink>,
}

impl RegistryClient {
    /// Create a client that reports swallowed errors to `sink`.
    pub fn new(client: Client, sink: Arc<dyn ErrorSink>) -> Self {
        Self { client, sink }
    }

    /// Check that the registry API at `domain` can be reached at all.
    ///
    /// Any HTTP response counts, whatever its status code, and the body is
    /// never inspected. Only a transport failure makes it return `false`, so
    /// `true` does not mean the host actually serves a registry.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn validate(&self, domain: &str) -> bool {
        let url = registry_url(domain, REGISTRY_API_PATH);
        match self.client.get(&url).send().await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Registry answered");
                true
            },
            Err(e) => {
                self.sink
                    .record_error(&format!("registry validation ({url})"), &Error::Network(e));
                false
            },
        }
    }

    /// Fetch the registry's node list and return its member nodes.
    ///
    /// `Ok` with an empty set means the registry lists no member nodes;
    /// any failure to obtain or read the list is an `Err`, already recorded
    /// in the error sink.
    ///
    /// # Errors
    ///
    /// [`Error::Network`] for transport failures and non-success statuses,
    /// [`Error::Parse`] / [`Error::Schema`] for documents that do not follow
    /// the node list contract (see [`parse_node_list`]).
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn list_nodes(&self, domain: &str) -> Result<NodeSet> {
        let url = registry_url(domain, NODE_LIST_PATH);
        match self.fetch_node_list(&url).await {
            Ok(nodes) => {
                info!(member_nodes = nodes.len(), "Listed member nodes");
                Ok(nodes)
            },
            Err(e) => {
                self.sink
                    .record_error(&format!("node listing ({url})"), &e);
                Err(e)
            },
        }
    }

    async fn fetch_node_list(&self, url: &str) -> Result<NodeSet> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let xml = response.text().await?;
        parse_node_list(&xml)
    }
}
