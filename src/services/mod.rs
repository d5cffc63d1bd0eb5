pub mod price_normalizer;
pub mod retry;
pub mod steam_market;

pub mod persist;
pub mod store;

pub mod telegram;
pub mod notifier;

pub mod account_service;
pub mod tracking_service;
pub mod price_monitor;
pub mod bot;
