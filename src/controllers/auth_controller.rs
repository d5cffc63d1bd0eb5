use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::Result, services::account_service, AppState};

use super::json_body;

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

// POST /api/register
pub async fn post_register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsForm>, JsonRejection>,
) -> Result<Json<Value>> {
    let form = json_body(payload)?;
    account_service::register(&state, &form.login, &form.password).await?;
    Ok(Json(json!({ "ok": true })))
}

// POST /api/login
pub async fn post_login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsForm>, JsonRejection>,
) -> Result<Json<Value>> {
    let form = json_body(payload)?;
    let token = account_service::login(&state, &form.login, &form.password).await?;
    Ok(Json(json!({ "ok": true, "token": token })))
}
