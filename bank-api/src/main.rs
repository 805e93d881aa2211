use bank_api::config::Config;
use bank_api::Application;
use service_core::error::AppError;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    tracing::info!(service = %config.service_name, "Starting bank-api");

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
