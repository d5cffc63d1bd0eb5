//! Library entrypoint for steam-track.
//!
//! `main.rs` only wires settings, the store and the background tasks; the
//! integration tests under `tests/` build the same `AppState` with fakes.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod templates;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{steam_market::PriceSource, store::Store, telegram::ChatSender};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub store: Arc<Store>,
    pub settings: config::Settings,
    pub prices: Arc<dyn PriceSource>,
    pub chat: Arc<dyn ChatSender>,
}
