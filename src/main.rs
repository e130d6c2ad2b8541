use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use zenodo_publish::{DepositionPublisher, ReqwestTransport, config::AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup (stderr; stdout carries the result) ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::debug!("Starting zenodo-publish with config: {:?}", cfg);

    // --- Wire transport + publisher ---
    let transport = ReqwestTransport::new(cfg.timeout)?;
    let publisher = DepositionPublisher::new(transport, cfg.base_url(), cfg.token.clone());
    tracing::info!("Publishing to {}", publisher.base_url());

    let record = publisher
        .publish(&cfg.publish_request())
        .await
        .with_context(|| format!("publishing new version of deposition {}", cfg.deposition_id))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
