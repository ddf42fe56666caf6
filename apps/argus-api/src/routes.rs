use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	routing::{get, post},
};

use argus_service::{SearchRequest, SearchResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

/// Always answers 200; a degraded search is served from the built-in dataset.
async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Json<SearchResponse> {
	Json(state.service.search_intelligence(payload).await)
}
