// oil-dashboard-rs/src/main.rs
// Oil analysis dashboard service
//
// Serves explanations for predicted failure classes and records
// (sample, prediction) rows. Port 8000 by default.

use std::sync::Arc;

use oil_dashboard::{router, AppState, Classifier, DashboardConfig, HttpClassifier, PredictionLog};
use reasoning_sdk::config::DEFAULT_PROVIDER;
use reasoning_sdk::{
    GenerativeBackend, KnowledgeBase, OpenAiCompatibleBackend, ReasoningAssembler, RetryConfig,
    RetryingBackend,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config_rs::load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let _ = *oil_dashboard::routes::START_TIME;

    let config = DashboardConfig::from_env()?;
    log::info!("Using dashboard address: {}", config.bind_addr);

    let knowledge = match &config.knowledge_path {
        Some(path) => {
            log::info!("Loading diagnostic knowledge from {}", path.display());
            KnowledgeBase::from_file(path)?
        }
        None => KnowledgeBase::builtin(),
    };

    let backend = OpenAiCompatibleBackend::from_env()?;
    let retry = RetryConfig::from_provider(&**DEFAULT_PROVIDER)?;
    let backend: Arc<dyn GenerativeBackend> = if retry.is_enabled() {
        log::info!("Backend retries enabled: {}", retry);
        Arc::new(RetryingBackend::new(backend, retry))
    } else {
        Arc::new(backend)
    };

    let classifier: Option<Arc<dyn Classifier>> = match &config.classifier_url {
        Some(url) => {
            log::info!("Using classifier at {}", url);
            Some(Arc::new(HttpClassifier::new(url.clone(), config.classifier_timeout)?))
        }
        None => {
            log::warn!("No classifier configured; explain requests must name a class");
            None
        }
    };

    let state = AppState {
        assembler: ReasoningAssembler::new(Arc::new(knowledge), backend),
        classifier,
        prediction_log: Arc::new(PredictionLog::open(&config.prediction_log_path)?),
    };

    let app = router(state, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("Oil dashboard listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
