use graphene_network::connection::BITSHARES_MAINNET_CHAIN_ID;
use graphene_network::{PeerClient, PeerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Seed node spoken to when no target is given on the command line.
const DEFAULT_TARGET: &str = "45.32.226.24:1776";

/// Mainnet block id used as the starting synopsis for the sync walk.
const SYNOPSIS_HEAD: &str = "027459d691393208e653d28b5592dc429de6f1dc";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_TARGET.to_string());

    let config = PeerConfig::new(BITSHARES_MAINNET_CHAIN_ID, SYNOPSIS_HEAD.parse()?);
    info!(%target, "connecting");
    let client = PeerClient::connect(target.as_str(), config).await?;

    tokio::select! {
        result = client.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted, closing"),
    }

    Ok(())
}
