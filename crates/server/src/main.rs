//! Handscribe Server - HTTP API for handwriting style profiles and generation

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; invalid settings abort before anything starts
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
