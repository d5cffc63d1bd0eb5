use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::Result,
    services::account_service::{self, SettingsUpdate, SettingsView},
    AppState,
};

use super::{json_body, pick_token, TokenQuery};

#[derive(Deserialize, Default)]
pub struct TokenForm {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct SettingsForm {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(flatten)]
    pub update: SettingsUpdate,
}

// GET /api/state?token=
pub async fn get_state(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
) -> Result<Json<Value>> {
    let token = pick_token(None, &q);
    let s = account_service::account_state(&state, &token).await?;

    Ok(Json(json!({
        "ok": true,
        "login": s.login,
        "settings": s.settings,
        "paired": s.paired,
        "tg_username": s.tg_username,
        "pair_code": s.pair_code,
        "items": s.items,
    })))
}

// POST /api/pair/start
pub async fn post_pair_start(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    payload: std::result::Result<Json<TokenForm>, JsonRejection>,
) -> Result<Json<Value>> {
    let form = payload.map(|Json(f)| f).unwrap_or_default();
    let token = pick_token(form.token.as_deref(), &q);

    let pairing = account_service::start_pairing(&state, &token).await?;
    Ok(Json(json!({ "ok": true, "code": pairing.code, "link": pairing.link })))
}

// POST /api/settings
pub async fn post_settings(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    payload: std::result::Result<Json<SettingsForm>, JsonRejection>,
) -> Result<Json<Value>> {
    let form = json_body(payload)?;
    let token = pick_token(form.token.as_deref(), &q);

    let settings = account_service::update_settings(&state, &token, &form.update).await?;
    Ok(Json(json!({ "ok": true, "settings": SettingsView::from(&settings) })))
}

// POST /api/ping
pub async fn post_ping(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    payload: std::result::Result<Json<TokenForm>, JsonRejection>,
) -> Result<Json<Value>> {
    let form = payload.map(|Json(f)| f).unwrap_or_default();
    let token = pick_token(form.token.as_deref(), &q);

    account_service::ping(&state, &token).await?;
    Ok(Json(json!({ "ok": true })))
}
