//! `word-lsp`: serves word completion over stdio.

use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;
use word_lsp_server::WordLspBackend;

/// `RUST_LOG` wins when set; otherwise only info and above.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout belongs to the JSON-RPC stream.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "word-lsp listening on stdio");

    let (service, socket) = LspService::new(WordLspBackend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
