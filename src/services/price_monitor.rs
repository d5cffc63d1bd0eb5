use std::collections::HashMap;

use chrono::Utc;
use serde_json::json;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::{
    error::Result,
    models::{Account, TrackedItem},
    AppState,
};

use super::notifier::{self, fmt2};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub checked: usize,
    pub fetch_failed: usize,
    pub notified: usize,
}

pub fn spawn_price_monitor(state: AppState) {
    tokio::spawn(async move {
        let mut interval = time::interval(state.settings.poll_idle);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match run_tick(&state, Utc::now().timestamp()).await {
                Ok(r) if r.checked > 0 => info!(
                    checked = r.checked,
                    failed = r.fetch_failed,
                    notified = r.notified,
                    "price monitor tick"
                ),
                Ok(_) => {}
                Err(e) => error!(error = %e, "price monitor tick failed"),
            }
        }
    });
}

/// One scan over every tracked item, as of `now` (unix seconds).
///
/// Network I/O runs on a snapshot; only the touched items' check/notify
/// fields are written back, and items untracked meanwhile are dropped.
pub async fn run_tick(state: &AppState, now: i64) -> Result<TickReport> {
    let snapshot = state.store.snapshot().await;

    let owners: HashMap<&str, &Account> = snapshot
        .accounts
        .iter()
        .map(|a| (a.token.as_str(), a))
        .collect();

    let mut report = TickReport::default();
    let mut touched: Vec<TrackedItem> = Vec::new();

    for item in &snapshot.items {
        if !item.enabled {
            continue;
        }
        let Some(owner) = owners.get(item.owner_token.as_str()) else {
            continue;
        };
        let Some(chat_id) = owner.chat_id else {
            continue;
        };
        if now - item.last_checked_at < owner.settings.interval_secs() {
            continue;
        }

        let mut item = item.clone();
        let currency = owner.settings.currency;

        let price = state
            .prices
            .fetch_price(item.appid, &item.market_hash_name, currency.code())
            .await;
        report.checked += 1;

        // the stamp advances even on failure so a dead item isn't re-polled every tick
        item.last_checked_at = now;
        item.last_price = price;

        let Some(price) = price else {
            report.fetch_failed += 1;
            touched.push(item);
            continue;
        };

        let cooling_down = now - item.last_notified_at < state.settings.notify_cooldown_secs;
        if !cooling_down && item.direction.is_hit(price, item.target_price) {
            item.last_notified_at = now;
            report.notified += 1;

            debug!(item_id = %item.id, chat_id, price, target = item.target_price, "threshold crossed");

            let ctx = json!({
                "name": item.market_hash_name,
                "price": fmt2(price),
                "target": fmt2(item.target_price),
                "currency": currency.label(),
                "direction": item.direction.as_str(),
            });
            let text = notifier::render(state, owner.settings.lang, "price_alert", &ctx);
            notifier::notify(state, chat_id, &text).await;
        }

        touched.push(item);
    }

    if touched.is_empty() {
        return Ok(report);
    }

    let mut db = state.store.lock().await;
    for fresh in touched {
        if let Some(current) = db.items.iter_mut().find(|i| i.id == fresh.id) {
            current.last_checked_at = fresh.last_checked_at;
            current.last_price = fresh.last_price;
            current.last_notified_at = fresh.last_notified_at;
        }
    }
    state.store.save_items(&db).await?;

    Ok(report)
}
