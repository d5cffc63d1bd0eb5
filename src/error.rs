use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("unknown or missing token")]
    Unauthenticated,

    #[error("login is already registered")]
    AlreadyExists,

    #[error("not found")]
    NotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("price lookup unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("telegram error: {0}")]
    Telegram(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Stable code sent to API clients in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Unauthenticated => "unauthenticated",
            AppError::AlreadyExists => "already_exists",
            AppError::NotFound => "not_found",
            AppError::WrongPassword => "wrong_password",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::Persistence(_) => "persistence_failure",
            AppError::Telegram(_) => "telegram_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::WrongPassword => StatusCode::UNAUTHORIZED,
            AppError::AlreadyExists => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::UpstreamUnavailable(_) | AppError::Telegram(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Persistence(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Persistence(msg) = &self {
            tracing::error!(error = %msg, "request aborted by persistence failure");
        }

        let body = json!({ "ok": false, "error": self.code() });
        (self.status(), Json(body)).into_response()
    }
}
