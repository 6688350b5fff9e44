//! Basic usage of the etcd v2 client: a key lifecycle, then a directory
//! lifecycle
//!
//! Run with: cargo run --example basic_usage
//!
//! Reads ETCD_ENDPOINT, ETCD_ROOT, ETCD_USERNAME and ETCD_PASSWORD.
//! Log level follows RUST_LOG (default `info`).

use etcd_v2_client::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = Client::from_env()?;
    info!("Connected to {} (root {:?})", client.endpoint(), client.root());

    info!("=== Key ===");
    let created = client.create("a123", "123456", None).await?;
    info!("create: {:?} {:?}", created.action, created.node);

    let read = client.get("a123").await?;
    info!("get: {:?}", read.value());

    let set = client.set("a123", "11111").await?;
    info!("set: {:?} (was {:?})", set.action, set.prev_node.and_then(|n| n.value));

    let updated = client.update("a123", "12345", None).await?;
    info!("update: {:?}", updated.value());

    let deleted = client.delete("a123").await?;
    info!("delete: {:?}", deleted.action);

    info!("=== Directory ===");
    client.create_dir("dirA", None).await?;
    client.set("dirA/aaaa", "aaaa").await?;

    let listing = client.list("dirA", false).await?;
    for node in listing.node.map(|n| n.nodes).unwrap_or_default() {
        info!("  {} = {:?}", node.key, node.value);
    }

    let refreshed = client.update_dir("dirA", 200).await?;
    info!("update_dir: ttl {:?}", refreshed.node.and_then(|n| n.ttl));

    let upserted = client.set_dir("dirA", 100).await?;
    info!("set_dir: {:?} ttl {:?}", upserted.action, upserted.node.and_then(|n| n.ttl));

    client.delete_dir("dirA", true).await?;
    info!("Removed dirA");

    Ok(())
}
