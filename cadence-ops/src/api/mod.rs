//! HTTP API module
//!
//! REST endpoints for the follow-up sequencer and the trainer. Handlers
//! translate domain errors into status codes here so the orchestration
//! layers stay HTTP-free.

pub mod handlers;
pub mod server;

use crate::error::Error;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a domain error to its HTTP representation
pub fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::InvalidState(_) | Error::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = error_response(Error::NotFound("x".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = error_response(Error::Validation("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(Error::InvalidState("x".into()));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = error_response(Error::Conflict("x".into()));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = error_response(Error::Internal("x".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
