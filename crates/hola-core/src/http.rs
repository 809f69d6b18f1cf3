//! Shared HTTP client and URL helpers.

use crate::config::HttpConfig;
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

/// Default `User-Agent` header.
pub const USER_AGENT: &str = concat!("node-hola/", env!("CARGO_PKG_VERSION"));

/// Build the client every registry and node request goes through.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(Error::Network)
}

/// Normalize a domain string by removing protocol, path and surrounding whitespace.
///
/// The port is kept.
pub fn normalize_domain(domain: &str) -> String {
    let mut normalized = domain.trim();

    if let Some(stripped) = normalized.strip_prefix("https://") {
        normalized = stripped;
    } else if let Some(stripped) = normalized.strip_prefix("http://") {
        normalized = stripped;
    }

    if let Some(slash_pos) = normalized.find('/') {
        normalized = &normalized[..slash_pos];
    }

    normalized.to_string()
}

/// Absolute URL for `path` on the registry at `domain`.
///
/// Loopback hosts are addressed over plain http, everything else over https.
pub fn registry_url(domain: &str, path: &str) -> String {
    let protocol = if domain.starts_with("127.0.0.1") || domain.starts_with("localhost") {
        "http"
    } else {
        "https"
    };
    format!("{protocol}://{domain}{path}")
}
