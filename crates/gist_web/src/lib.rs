use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/news/full-pipeline", get(handlers::full_pipeline))
        .route("/news/deep-dive", get(handlers::deep_dive))
        .route("/articles/fetch-and-store", post(handlers::fetch_and_store))
        .route("/script/generate", post(handlers::generate_script))
        .route("/script/generate-deep-dive", get(handlers::generate_deep_dive_script))
        .route("/voiceover/generate", post(handlers::generate_voiceover))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use gist_core::{Error, Result};
}
