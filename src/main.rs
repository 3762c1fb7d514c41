use alt_transport_frontend::{config, server};
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (absent in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("alt_transport_frontend=info".parse()?),
        )
        .init();

    let config = config::Config::from_env()?;
    info!(
        environment = ?config.environment,
        languages = ?config.supported_languages,
        fallback = %config.fallback_language,
        "Starting app server"
    );

    server::serve(config).await?;

    info!("Server stopped");
    Ok(())
}
