use catalog_assistant::{config::AssistantConfig, services::init_metrics, Application};
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AssistantConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    tracing::info!(
        environment = ?config.environment,
        "Starting {}",
        config.service_name
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
