use axum::{Router, routing::post};
use crate::{AppState, controllers::auth_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/register", post(auth_controller::post_register))
        .route("/api/login", post(auth_controller::post_login))
}
