//! Mapping of request failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::types::ErrorResponse;
use crate::temperature::DaemonError;

/// Errors a handler can return.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A dependency we proxy to failed. Every kind of daemon failure lands
    /// here and is reported as 502; the message tells them apart.
    #[error(transparent)]
    Upstream(#[from] DaemonError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
