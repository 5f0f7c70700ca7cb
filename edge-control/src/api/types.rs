//! Request and response bodies shared by the server and [`crate::api_client`].

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct HealthStatus {
    /// Always "ok" while the server is answering
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Query parameters for `POST /power`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PowerQuery {
    /// Requested power state
    #[serde(rename = "powerOn")]
    pub power_on: bool,
}

/// Power state as acknowledged by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct PowerState {
    #[serde(rename = "powerOn")]
    pub power_on: bool,
}

/// API error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable description of what failed
    pub detail: String,
}
