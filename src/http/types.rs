//! HTTP API request and response types.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::waitlist::{WaitlistError, WaitlistService};

/// Shared application state.
pub type AppState = Arc<WaitlistService>;

/// Signup request body.
#[derive(Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
    pub email: String,
}

/// `?ref=CODE` on the signup route.
#[derive(Deserialize)]
pub struct RefQuery {
    #[serde(rename = "ref")]
    pub referred_by: Option<String>,
}

/// `?email=` on the position route.
#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Social share request body.
#[derive(Deserialize)]
pub struct ShareRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct ShareResponse {
    pub points_awarded: u32,
}

/// Uniform response envelope.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable machine-readable code, present on errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            ok: true,
            data: Some(data),
            error: None,
            code: None,
        })
    }

    pub fn error(msg: impl Into<String>, code: &'static str) -> Json<Self> {
        Json(Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
            code: Some(code),
        })
    }
}

impl IntoResponse for WaitlistError {
    fn into_response(self) -> Response {
        let status = match self {
            WaitlistError::Validation(_) => StatusCode::BAD_REQUEST,
            WaitlistError::DuplicateEmail => StatusCode::CONFLICT,
            WaitlistError::NotFound => StatusCode::NOT_FOUND,
            WaitlistError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ApiResponse::<()>::error(self.to_string(), self.code());

        (status, body).into_response()
    }
}
