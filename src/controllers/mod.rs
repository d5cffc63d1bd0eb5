use axum::{extract::rejection::JsonRejection, Json};
use serde::Deserialize;

use crate::error::{AppError, Result};

pub mod account_controller;
pub mod auth_controller;
pub mod home_controller;
pub mod items_controller;

/// `?token=` on any API route.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// Body token wins over the query one.
pub fn pick_token(body: Option<&str>, query: &TokenQuery) -> String {
    body.map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| query.token.as_deref().map(str::trim))
        .unwrap_or_default()
        .to_string()
}

/// Malformed JSON becomes a regular `invalid_input` failure body.
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|_| AppError::InvalidInput("malformed json body"))
}
