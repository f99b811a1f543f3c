//! Application router configuration.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints, not_found::get_404_not_found, transactions_endpoint::get_transactions,
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are allowed from any origin, with any method and headers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(endpoints::TRANSACTION, get(get_transactions))
        .route(endpoints::TRANSACTIONS, get(get_transactions))
        .fallback(get_404_not_found)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Acknowledge that the server is up.
async fn get_root() -> Json<Value> {
    Json(json!({ "response": "work" }))
}
