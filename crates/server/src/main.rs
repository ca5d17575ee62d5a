//! EduRAG Server - HTTP REST API for curriculum document retrieval
//!
//! This binary serves the EduRAG pipeline over REST endpoints with
//! authentication and rate limiting.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up EDURAG_SERVER__* overrides from a local .env in development
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;
    server::start_server(config).await?;

    Ok(())
}
