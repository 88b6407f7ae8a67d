use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pf_core::Error;
use serde_json::json;

/// Error half of every handler's result. Rendered as `{error, outcomes?}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Core(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Core(e) => match e {
                Error::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
                Error::Discovery { .. } => StatusCode::BAD_GATEWAY,
                Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::NotFound(message) => json!({ "error": message }),
            ApiError::Core(e) => {
                if status.is_server_error() {
                    tracing::error!(error = %e, "request failed");
                }
                match e.outcomes() {
                    Some(outcomes) => json!({ "error": e.to_string(), "outcomes": outcomes }),
                    None => json!({ "error": e.to_string() }),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
