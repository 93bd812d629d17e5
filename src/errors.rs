use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can surface, with its HTTP mapping in one
/// place. Domain code propagates these with `?`; nothing formats its own
/// error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required fields")]
    MissingFields(Vec<&'static str>),
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered")]
    DuplicateEmail,
    // Same message for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    AuthToken(&'static str),
    #[error("Access denied")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Internal(&'static str),
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_)
            | ApiError::Validation(_)
            | ApiError::DuplicateEmail
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::AuthToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(e) = &self {
            tracing::error!("database error: {e:?}");
        }
        let status = self.status();
        let body = match &self {
            ApiError::MissingFields(required) => json!({
                "error": "Missing required fields",
                "required": required,
            }),
            ApiError::Database(_) => json!({ "error": "Database error" }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::MissingFields(vec!["name"]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::AuthToken("No token provided").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("Task not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upstream("no address".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
