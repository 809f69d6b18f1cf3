//! node-hola - list DataONE member nodes and their server software.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    hola_cli::run().await
}
