use crate::services::{identity::AuthError, store::StoreError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

const INTERNAL_MESSAGE: &str = "internal server error";

/// A lightweight wrapper for general errors that keeps the message local.
///
/// Server-side failures keep their detail in `message` for the log; the
/// client only ever sees a generic body for them.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// 404 for an owner-scoped mutation that matched nothing. Deliberately
    /// the same answer whether the document is missing or someone else's.
    pub fn not_found_or_not_owned() -> Self {
        Self::not_found("not found or not owned")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), "{}", self.message);
            INTERNAL_MESSAGE.to_string()
        } else {
            self.message
        };

        let body = Json(json!({
            "error": message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::new(StatusCode::CONFLICT, "already exists"),
            other => AppError::internal(format!("store error: {}", other)),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential => {
                AppError::new(StatusCode::UNAUTHORIZED, "unauthorized access")
            }
            AuthError::Rejected(_) => AppError::new(StatusCode::FORBIDDEN, "forbidden access"),
            other => AppError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn server_errors_hide_detail() {
        let (status, body) =
            body_json(AppError::internal("sqlite: disk I/O error at /var/db")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_MESSAGE);
        assert_eq!(body["status"], 500);
    }

    #[tokio::test]
    async fn client_errors_keep_message() {
        let (status, body) = body_json(AppError::bad_request("invalid id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid id");
    }

    #[test]
    fn auth_errors_map_to_distinct_statuses() {
        assert_eq!(
            AppError::from(AuthError::MissingCredential).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::Rejected("expired".into())).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::NotConfigured).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(AuthError::Provider("timeout".into())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        assert_eq!(
            AppError::from(StoreError::Duplicate).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(StoreError::EmptyPatch).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
