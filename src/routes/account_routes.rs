use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::account_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/state", get(account_controller::get_state))
        .route("/api/pair/start", post(account_controller::post_pair_start))
        .route("/api/settings", post(account_controller::post_settings))
        .route("/api/ping", post(account_controller::post_ping))
}
