pub mod error;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState) -> Router {
    let upload_limit = state.upload_limit;

    Router::new()
        .route("/", get(routes::home))
        .route("/predict", post(routes::predict))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
