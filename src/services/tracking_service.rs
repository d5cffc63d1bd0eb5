use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::{AppError, Result},
    models::{Direction, TrackedItem},
    AppState,
};

use super::notifier::{self, fmt2};

/// Raw track request as the extension sends it; numbers may arrive as strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackInput {
    #[serde(default)]
    pub appid: Value,
    #[serde(default, alias = "name")]
    pub market_hash_name: String,
    #[serde(default, alias = "target")]
    pub target_price: Value,
    #[serde(default)]
    pub direction: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    PriceUnknown,
    TargetReached,
    WaitingForDrop,
    WaitingForRise,
}

impl Advisory {
    pub fn compute(direction: Direction, target: f64, price: Option<f64>) -> Self {
        let Some(price) = price else {
            return Advisory::PriceUnknown;
        };
        match direction {
            Direction::Buy if target >= price => Advisory::TargetReached,
            Direction::Buy => Advisory::WaitingForDrop,
            Direction::Sell if target <= price => Advisory::TargetReached,
            Direction::Sell => Advisory::WaitingForRise,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Advisory::PriceUnknown => "price_unknown",
            Advisory::TargetReached => "target_reached",
            Advisory::WaitingForDrop => "waiting_for_drop",
            Advisory::WaitingForRise => "waiting_for_rise",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackOutcome {
    pub item: TrackedItem,
    pub advisory: Advisory,
}

struct ValidTrack {
    appid: u32,
    name: String,
    target: f64,
    direction: Direction,
}

fn parse_appid(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn parse_target(v: &Value) -> Option<f64> {
    let t = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    (t.is_finite() && t > 0.0).then_some(t)
}

fn validate(input: &TrackInput) -> Result<ValidTrack> {
    let appid = parse_appid(&input.appid).ok_or(AppError::InvalidInput("appid"))?;
    let target = parse_target(&input.target_price).ok_or(AppError::InvalidInput("target_price"))?;

    let name = input.market_hash_name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("market_hash_name"));
    }

    let direction = Direction::parse(&input.direction).ok_or(AppError::InvalidInput("direction"))?;

    Ok(ValidTrack {
        appid,
        name: name.to_string(),
        target,
        direction,
    })
}

fn new_item_id() -> String {
    hex::encode(rand::random::<[u8; 12]>())
}

pub async fn track(state: &AppState, token: &str, input: &TrackInput) -> Result<TrackOutcome> {
    let (currency, chat_id, lang) = {
        let db = state.store.lock().await;
        let acc = db.account_by_token(token).ok_or(AppError::Unauthenticated)?;
        (acc.settings.currency, acc.chat_id, acc.settings.lang)
    };
    let req = validate(input)?;

    // network I/O without the lock
    let price = state
        .prices
        .fetch_price(req.appid, &req.name, currency.code())
        .await;
    let now = Utc::now().timestamp();

    let item = {
        let mut db = state.store.lock().await;
        if db.account_by_token(token).is_none() {
            return Err(AppError::Unauthenticated);
        }

        let mut items = db.items.clone();
        let item = match items
            .iter_mut()
            .find(|i| i.same_target(token, req.appid, &req.name))
        {
            Some(existing) => {
                existing.target_price = req.target;
                existing.direction = req.direction;
                existing.enabled = true;
                existing.last_price = price;
                existing.last_checked_at = now;
                existing.clone()
            }
            None => {
                let item = TrackedItem {
                    id: new_item_id(),
                    owner_token: token.to_string(),
                    appid: req.appid,
                    market_hash_name: req.name.clone(),
                    target_price: req.target,
                    direction: req.direction,
                    enabled: true,
                    last_price: price,
                    last_checked_at: now,
                    last_notified_at: 0,
                    created_at: now,
                };
                items.push(item.clone());
                item
            }
        };

        state.store.commit_items(&mut db, items).await?;
        item
    };

    let advisory = Advisory::compute(item.direction, item.target_price, item.last_price);
    info!(
        item_id = %item.id,
        appid = item.appid,
        item = %item.market_hash_name,
        direction = item.direction.as_str(),
        advisory = advisory.as_str(),
        "tracking item"
    );

    if let Some(chat_id) = chat_id {
        let ctx = json!({
            "name": item.market_hash_name,
            "price": item.last_price.map(fmt2),
            "target": fmt2(item.target_price),
            "currency": currency.label(),
            "direction": item.direction.as_str(),
            "advisory": advisory.as_str(),
        });
        let text = notifier::render(state, lang, "track_started", &ctx);
        notifier::notify(state, chat_id, &text).await;
    }

    Ok(TrackOutcome { item, advisory })
}

/// Removes the caller's own item. Unknown ids and other users' items are a
/// silent no-op; returns whether something was removed.
pub async fn untrack(state: &AppState, token: &str, item_id: &str) -> Result<bool> {
    let mut db = state.store.lock().await;
    if db.account_by_token(token).is_none() {
        return Err(AppError::Unauthenticated);
    }

    let mut items = db.items.clone();
    items.retain(|i| !(i.id == item_id && i.owner_token == token));
    let removed = items.len() != db.items.len();

    if removed {
        state.store.commit_items(&mut db, items).await?;
        info!(item_id, "item untracked");
    }
    Ok(removed)
}

pub async fn list(state: &AppState, token: &str) -> Result<Vec<TrackedItem>> {
    let db = state.store.lock().await;
    if db.account_by_token(token).is_none() {
        return Err(AppError::Unauthenticated);
    }

    let mut items: Vec<TrackedItem> = db.items_of(token).cloned().collect();
    items.sort_by_key(|i| i.created_at);
    Ok(items)
}
