mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::BulletinBoard;

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Shared-state relay for two paddle-ball clients")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = shared::RELAY_PORT)]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay=info".into()),
        )
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    // The board lives for the whole process; every connection shares it.
    let board = Arc::new(RwLock::new(BulletinBoard::new()));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Relay listening on {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::info!(peer = %peer, "Client connected");
        let board = board.clone();
        tokio::spawn(async move {
            if let Err(err) = service::serve_connection(stream, board).await {
                tracing::warn!(peer = %peer, error = %err, "Connection closed with error");
            } else {
                tracing::info!(peer = %peer, "Client disconnected");
            }
        });
    }
}
