use tracing_subscriber::EnvFilter;

use ctrl180_lambda::app;
use ctrl180_lambda::config::ServiceConfig;
use ctrl180_lambda::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = ServiceConfig::from_env();
    tracing::info!(
        template_dirs = ?config.template_dirs,
        chart_timeout_ms = config.chart_timeout_ms,
        strict_template = config.strict_template,
        "starting fill-template service"
    );

    let state = AppState::new(config);

    lambda_http::run(app(state)).await.map_err(|e| eyre::eyre!(e))
}
