//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Rejections raised while parsing a whitelist command.
///
/// The `Display` text is the notice sent back to the invoking player.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Incorrect match duration.")]
    IncorrectDuration,

    #[error("Incorrect command parameters.")]
    IncorrectParameters,

    #[error("Player \"{0}\" not found.")]
    PlayerNotFound(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server full: {0} players connected")]
    ServerFull(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Json(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NotFound(e) => (StatusCode::NOT_FOUND, e.clone()),
            AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::ServerFull(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_command_error_notices() {
        assert_eq!(
            CommandError::IncorrectDuration.to_string(),
            "Incorrect match duration."
        );
        assert_eq!(
            CommandError::IncorrectParameters.to_string(),
            "Incorrect command parameters."
        );
        assert_eq!(
            CommandError::PlayerNotFound("ghost".into()).to_string(),
            "Player \"ghost\" not found."
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("player 4".to_string());
        assert_eq!(format!("{}", err), "Not found: player 4");

        let err = AppError::BadRequest("callsign taken".to_string());
        assert_eq!(format!("{}", err), "Bad request: callsign taken");

        let err = AppError::ServerFull(200);
        assert_eq!(format!("{}", err), "Server full: 200 players connected");
    }

    #[test]
    fn test_not_found_into_response() {
        let response = AppError::NotFound("player".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_request_into_response() {
        let response = AppError::BadRequest("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_server_full_into_response() {
        let response = AppError::ServerFull(200).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_into_response() {
        let response = AppError::Internal("broken".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_json_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = serde_err.into();
        assert!(matches!(err, AppError::Json(_)));
        assert!(err.to_string().starts_with("Invalid message: "));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
