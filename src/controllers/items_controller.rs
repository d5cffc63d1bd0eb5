use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, Result},
    services::tracking_service::{self, TrackInput},
    AppState,
};

use super::{json_body, pick_token, TokenQuery};

#[derive(Deserialize)]
pub struct TrackForm {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(flatten)]
    pub input: TrackInput,
}

#[derive(Deserialize)]
pub struct UntrackForm {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "id")]
    pub item_id: String,
}

// POST /api/track
pub async fn post_track(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    payload: std::result::Result<Json<TrackForm>, JsonRejection>,
) -> Result<Json<Value>> {
    let form = json_body(payload)?;
    let token = pick_token(form.token.as_deref(), &q);

    let out = tracking_service::track(&state, &token, &form.input).await?;
    Ok(Json(json!({ "ok": true, "item": out.item, "advisory": out.advisory })))
}

// POST /api/untrack
pub async fn post_untrack(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    payload: std::result::Result<Json<UntrackForm>, JsonRejection>,
) -> Result<Json<Value>> {
    let form = json_body(payload)?;
    let token = pick_token(form.token.as_deref(), &q);

    let item_id = form.item_id.trim();
    if item_id.is_empty() {
        // still reject strangers before complaining about the id
        tracking_service::list(&state, &token).await?;
        return Err(AppError::InvalidInput("item_id"));
    }

    let removed = tracking_service::untrack(&state, &token, item_id).await?;
    Ok(Json(json!({ "ok": true, "removed": removed })))
}
