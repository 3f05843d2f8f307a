//! Lexicon server CLI
//!
//! Run with: `cargo run -p lexicon_server -- --help`

use clap::Parser;
use lexicon_core::{init_logging, LogTarget};
use lexicon_server::{LexiconServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    let target = LogTarget::from_dir(config.log_dir.as_deref())?;
    init_logging(&config.log_level, target)?;

    log::info!(
        "event=server_start module=server status=ok version={} addr={} body_limit={} import_timeout_secs={} cors_origin={}",
        env!("CARGO_PKG_VERSION"),
        config.listen_addr,
        config.body_limit,
        config.import_timeout_secs,
        config.cors_origin
    );

    let server = LexiconServer::new(config)?;
    server.run().await?;
    Ok(())
}
