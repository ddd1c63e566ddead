mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AnalyzerConfig;
use crate::orchestrator::AnalyzeOrchestrator;
use middleware::{cors_layer, rate_limit_middleware, RateLimiter};

/// Shared handler state. The orchestrator and its index are read-only.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalyzeOrchestrator>,
}

/// HTTP-layer settings taken from [`AnalyzerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub cors_origins: Option<Vec<String>>,
    pub rate_limit: Option<u32>,
}

impl From<&AnalyzerConfig> for ServerOptions {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            cors_origins: config.cors_origins.clone(),
            rate_limit: config.rate_limit,
        }
    }
}

pub fn create_router(orchestrator: AnalyzeOrchestrator, options: ServerOptions) -> Router {
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };

    let mut analyze = Router::new().route("/analyze", post(handlers::analyze));
    if let Some(max_requests) = options.rate_limit {
        let limiter = RateLimiter::per_minute(max_requests);
        analyze = analyze.route_layer(from_fn_with_state(limiter, rate_limit_middleware));
    }

    Router::new()
        .merge(analyze)
        .route("/search", post(handlers::search))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(options.cors_origins.as_deref())),
        )
        .with_state(state)
}
