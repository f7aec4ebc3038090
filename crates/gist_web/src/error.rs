use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gist_core::Error;
use serde_json::json;
use tracing::error;

/// A pipeline failure with the message prefix of the endpoint that hit it.
#[derive(Debug)]
pub struct ApiError {
    context: &'static str,
    source: Error,
}

impl ApiError {
    pub fn new(context: &'static str, source: Error) -> Self {
        Self { context, source }
    }

    /// For `map_err`: `.map_err(ApiError::context("Failed to generate script"))`
    pub fn context(context: &'static str) -> impl FnOnce(Error) -> Self {
        move |source| Self::new(context, source)
    }

    pub fn status(&self) -> StatusCode {
        match self.source {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self.source {
            Error::NotFound(ref msg) => msg.clone(),
            ref other => format!("{}: {}", self.context, other),
        };

        if status.is_server_error() {
            error!(retryable = self.source.is_retryable(), "{}", detail);
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
