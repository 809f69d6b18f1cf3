//! End-to-end pipeline: validate a domain, list its member nodes, probe each one.

use crate::config::Config;
use crate::http::{build_client, normalize_domain};
use crate::prober::NodeProber;
use crate::registry::RegistryClient;
use crate::sink::ErrorSink;
use crate::types::{NodeReport, NodeSet};
use crate::{Error, Result};
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use tracing::{info, instrument};

/// Drives one survey of an operating domain.
pub struct Survey {
    registry: RegistryClient,
    prober: NodeProber,
    sink: Arc<dyn ErrorSink>,
    concurrency: usize,
}

impl Survey {
    /// Assemble a survey from its parts.
    ///
    /// A `concurrency` of 0 is treated as 1.
    pub fn new(
        registry: RegistryClient,
        prober: NodeProber,
        sink: Arc<dyn ErrorSink>,
        concurrency: usize,
    ) -> Self {
        Self {
            registry,
            prober,
            sink,
            concurrency: concurrency.max(1),
        }
    }

    /// Build a survey whose registry client and prober share one HTTP client.
    pub fn from_config(config: &Config, sink: Arc<dyn ErrorSink>) -> Result<Self> {
        let client = build_client(&config.http)?;
        let registry = RegistryClient::new(client.clone(), Arc::clone(&sink));
        let prober =
            NodeProber::new(client, Arc::clone(&sink)).with_strip_mode(config.probe.strip_mode);
        Ok(Self::new(registry, prober, sink, config.probe.concurrency))
    }

    /// Validate `domain` and list its member nodes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDomain`] if the registry cannot be reached, otherwise
    /// whatever [`RegistryClient::list_nodes`] fails with.
    #[instrument(skip(self))]
    pub async fn prepare(&self, domain: &str) -> Result<NodeSet> {
        let domain = normalize_domain(domain);
        if !self.registry.validate(&domain).await {
            let error = Error::InvalidDomain(domain);
            self.sink.record_error("domain validation", &error);
            return Err(error);
        }
        self.registry.list_nodes(&domain).await
    }

    /// Probe every node, yielding one report per node in `nodes` order.
    ///
    /// Up to `concurrency` probes run at once.
    pub fn probe_stream<'a>(&'a self, nodes: &'a NodeSet) -> impl Stream<Item = NodeReport> + 'a {
        stream::iter(nodes.iter())
            .map(move |node| async move { NodeReport::new(node, self.prober.probe(node).await) })
            .buffered(self.concurrency)
    }

    /// Run the whole pipeline and collect the reports.
    pub async fn run(&self, domain: &str) -> Result<Vec<NodeReport>> {
        let nodes = self.prepare(domain).await?;
        let reports: Vec<NodeReport> = self.probe_stream(&nodes).collect().await;
        info!(nodes = reports.len(), "Survey complete");
        Ok(reports)
    }
}
