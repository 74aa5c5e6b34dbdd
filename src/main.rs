//! Sudoku Duel Server
//!
//! Authoritative session server for a two-player networked Sudoku duel.
//! Listens on one UDP socket and runs the match loop until terminated.

use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use sudoku_duel::{GameServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let mut config = ServerConfig::default();
    if let Some(addr) = std::env::args().nth(1) {
        config.bind_addr = addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {:?}: {}", addr, e))?;
    }

    info!("Sudoku Duel Server v{}", VERSION);

    let server = Arc::new(GameServer::new(config));

    // A termination signal triggers a best-effort disconnect broadcast
    // before the loop exits.
    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await?;
    Ok(())
}
