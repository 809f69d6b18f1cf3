//! Member node server classification.
//!
//! ## Probe Order
//!
//! [`NodeProber::probe`] stops at the first probe that gets a success status:
//!
//! 1. `GET {base_url}/home`: a GMN status page. The node is GMN even if the
//!    version row cannot be found.
//! 2. `GET {stripped}/metacat?action=getversion`: only for base URLs
//!    containing `/d1/mn`. The node is Metacat even if the version document
//!    cannot be read.
//! 3. Otherwise the node is `Unknown`.
//!
//! Failures along the way are recorded in the [`ErrorSink`] and never
//! returned.

mod gmn;
mod metacat;

pub use gmn::{GMN_HOME_PATH, GMN_VERSION_LABEL, gmn_home_url, parse_gmn_version};
pub use metacat::{
    MEMBER_NODE_SEGMENT, METACAT_VERSION_PATH, StripMode, metacat_version_url,
    parse_metacat_version, strip_member_node_segment,
};

use crate::Error;
use crate::sink::ErrorSink;
use crate::types::{NodeRecord, NodeStatus, ProbeResult, ServerType};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, instrument};

/// What a single probe request produced.
#[derive(Debug)]
enum Attempt {
    /// 2xx with its body.
    Success(String),
    /// The server answered with a non-success status.
    Rejected,
    /// No HTTP response at all.
    Unreachable,
}

impl Attempt {
    const fn reached(&self) -> bool {
        !matches!(self, Self::Unreachable)
    }
}

/// Classifies member nodes by probing their HTTP endpoints.
#[derive(Clone)]
pub struct NodeProber {
    client: Client,
    sink: Arc<dyn ErrorSink>,
    strip_mode: StripMode,
}

impl NodeProber {
    /// Create a prober using the default [`StripMode`].
    pub fn new(client: Client, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            client,
            sink,
            strip_mode: StripMode::default(),
        }
    }

    /// Use `mode` when deriving the Metacat URL.
    #[must_use]
    pub const fn with_strip_mode(mut self, mode: StripMode) -> Self {
        self.strip_mode = mode;
        self
    }

    /// Classify `node` and extract its version.
    ///
    /// Always returns exactly one result; transport and parse failures are
    /// recorded in the error sink and degrade the result to `Unknown`.
    #[instrument(skip_all, fields(node = %node.identifier, base_url = %node.base_url))]
    pub async fn probe(&self, node: &NodeRecord) -> ProbeResult {
        let home = self.attempt(&gmn_home_url(&node.base_url)).await;
        let mut reached = home.reached();
        if let Attempt::Success(body) = home {
            let version = parse_gmn_version(&body);
            debug!(version = ?version, "Identified GMN");
            return ProbeResult::new(ServerType::Gmn, version, NodeStatus::Up);
        }

        if let Some(url) = metacat_version_url(&node.base_url, self.strip_mode) {
            let attempt = self.attempt(&url).await;
            reached |= attempt.reached();
            if let Attempt::Success(body) = attempt {
                let version = match parse_metacat_version(&body) {
                    Ok(version) => version,
                    Err(e) => {
                        self.sink
                            .record_error(&format!("metacat version ({url})"), &e);
                        None
                    },
                };
                debug!(version = ?version, "Identified Metacat");
                return ProbeResult::new(ServerType::Metacat, version, NodeStatus::Up);
            }
        }

        debug!(reached, "Server type not identified");
        ProbeResult::unknown(if reached {
            NodeStatus::Up
        } else {
            NodeStatus::Down
        })
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = Error::Network(e);
                let reached = !error.is_transport();
                self.sink.record_error(&format!("probe ({url})"), &error);
                return if reached {
                    Attempt::Rejected
                } else {
                    Attempt::Unreachable
                };
            },
        };

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "Probe rejected");
            return Attempt::Rejected;
        }

        match response.text().await {
            Ok(body) => Attempt::Success(body),
            Err(e) => {
                self.sink
                    .record_error(&format!("probe body ({url})"), &Error::Network(e));
                Attempt::Success(String::new())
            },
        }
    }
}
