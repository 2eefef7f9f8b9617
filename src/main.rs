use employee_search_proxy::{observability, Config, EngineResult, ProxyServer};

#[tokio::main]
async fn main() -> EngineResult<()> {
    observability::init_tracing()?;

    let config = Config::from_env()?;
    tracing::info!("Starting employee search proxy");

    let server = ProxyServer::new(config).await.map_err(|e| {
        tracing::error!("Startup failed: {}", e);
        e
    })?;
    server.run().await?;

    Ok(())
}
