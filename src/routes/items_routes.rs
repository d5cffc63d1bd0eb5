use axum::{Router, routing::post};
use crate::{AppState, controllers::items_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/track", post(items_controller::post_track))
        .route("/api/untrack", post(items_controller::post_untrack))
}
