use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::models::*;
use crate::orchestrator::AnalyzeError;

// ============================================================
// Error Handling
// ============================================================

/// Validation errors go back verbatim. Generation failures carry a cause and,
/// for unparseable output, a bounded excerpt of what the model returned.
impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = match &self {
            AnalyzeError::Validation(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AnalyzeError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Analyze failed: {}", self);
        } else {
            tracing::warn!("Validation error: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let indexed = state.orchestrator.retriever().indexed();
    Json(serde_json::json!({
        "status": "ok",
        "documents": indexed.corpus().len(),
        "vocabulary": indexed.index().vocabulary_len(),
    }))
}

// ============================================================
// Analyze
// ============================================================

pub async fn analyze(
    State(state): State<AppState>,
    Json(input): Json<AnalyzeInput>,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let proposals = state
        .orchestrator
        .handle(&input.requirements, input.num_proposals)
        .await?;
    Ok(Json(AnalyzeResponse { proposals }))
}

// ============================================================
// Search
// ============================================================

pub async fn search(
    State(state): State<AppState>,
    Json(input): Json<SearchInput>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let query = input.query.trim();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query required".to_string()));
    }

    let retriever = state.orchestrator.retriever();
    let top_k = input.top_k.unwrap_or_else(|| retriever.top_k());
    Ok(Json(SearchResponse {
        hits: retriever.retrieve_top(query, top_k),
    }))
}
