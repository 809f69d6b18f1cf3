#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// A `node-hola` command isolated from the user's config and environment.
///
/// Errors are logged to `errors.log` inside `work_dir`.
pub fn hola_cmd(work_dir: &Path) -> Command {
    let config = work_dir.join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "[http]\ntimeout_secs = 5\n").expect("failed to write test config");
    }

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("node-hola"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.current_dir(work_dir);
    cmd.env("NODE_HOLA_CONFIG", &config);
    for var in [
        "NODE_HOLA_TIMEOUT_SECS",
        "NODE_HOLA_USER_AGENT",
        "NODE_HOLA_CONCURRENCY",
        "NODE_HOLA_STRIP_MODE",
        "NODE_HOLA_SHOW_STATUS",
        "NODE_HOLA_ERROR_LOG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Domain argument addressing the mock server.
pub fn domain_of(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

pub fn node_xml(kind: &str, id: &str, base_url: &str) -> String {
    format!(
        "<node type=\"{kind}\" state=\"up\"><identifier>{id}</identifier>\
         <name>{id}</name><baseURL>{base_url}</baseURL></node>"
    )
}

/// Serve `/cn/v2` and a node list made of `nodes`.
pub async fn mount_registry(server: &MockServer, nodes: &[String]) {
    Mock::given(method("GET"))
        .and(path("/cn/v2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ns2:nodeList xmlns:ns2=\"http://ns.dataone.org/service/types/v2.0\">{}</ns2:nodeList>",
        nodes.concat()
    );
    Mock::given(method("GET"))
        .and(path("/cn/v2/node"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}
