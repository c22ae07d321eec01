mod config;
mod db;
mod errors;
mod feed;
mod job_source;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
mod store;
mod suggestions;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::feed::locks::UserLocks;
use crate::job_source::{AdzunaSource, CachedJobSource, JobSource};
use crate::llm_client::LlmClient;
use crate::matching::scorer::KeywordScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::suggestions::{DisabledSuggester, KeywordSuggester, LlmKeywordSuggester};

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: missing env vars or invalid learning constants abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobfeed v{}", env!("CARGO_PKG_VERSION"));
    info!("Learning config: {:?}", config.learning);

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Job source: Adzuna behind the daily Redis cache
    let adzuna = AdzunaSource::new(
        config.adzuna_app_id.clone(),
        config.adzuna_app_key.clone(),
        config.job_country.clone(),
        config.job_location.clone(),
    )?;
    let job_source: Arc<dyn JobSource> = Arc::new(CachedJobSource::new(
        Arc::new(adzuna),
        redis,
        config.job_country.clone(),
    ));

    // Keyword suggestions need an API key; without one, learning uses token deltas only
    let suggester: Arc<dyn KeywordSuggester> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmKeywordSuggester(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; keyword suggestions disabled");
            Arc::new(DisabledSuggester)
        }
    };

    let scorer = Arc::new(KeywordScorer::new(&config.learning));

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        job_source,
        suggester,
        scorer,
        user_locks: Arc::new(UserLocks::default()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
