use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod auth_routes;
pub mod account_routes;
pub mod items_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = auth_routes::add_routes(router);
    let router = account_routes::add_routes(router);
    let router = items_routes::add_routes(router);

    // the browser extension calls from its own origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .fallback(home_controller::not_found)
        .layer(cors)
        .with_state(state)
}
