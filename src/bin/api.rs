use financial_coach::{
    api::{start_server, ApiState},
    audit::AuditLog,
    coach::ModelAdvisor,
    config::CoachConfig,
    extraction::ModelExtractor,
    llm::ModelChain,
    pipeline::CoachingPipeline,
    store::InMemoryLedgerStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = CoachConfig::from_env()?;

    info!("Financial Coach - API Server");
    info!("Port: {}", config.server.port);

    let models = Arc::new(ModelChain::from_config(&config.extraction)?);
    info!(providers = ?models.names(), "Language model providers configured");

    let state = ApiState {
        store: Arc::new(InMemoryLedgerStore::new()),
        pipeline: Arc::new(CoachingPipeline::new(config.policy.clone())?),
        extractor: Arc::new(ModelExtractor::new(models.clone())),
        advisor: Arc::new(ModelAdvisor::new(models)),
        audit_log: Arc::new(AuditLog::with_capacity(config.server.audit_capacity)),
    };

    info!("Coaching pipeline initialized");

    start_server(state, config.server.port).await?;

    Ok(())
}
