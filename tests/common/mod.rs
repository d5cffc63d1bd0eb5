#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use http_body_util::BodyExt;
use steamtrack::{
    config::Settings,
    error::{AppError, Result},
    models::{Account, AccountSettings, Direction, TrackedItem},
    services::{steam_market::PriceSource, store::Store, telegram::ChatSender},
    templates, AppState,
};

/// Prices keyed by market hash name; unknown names are "unavailable".
#[derive(Default)]
pub struct FakePrices {
    prices: Mutex<HashMap<String, f64>>,
    pub calls: AtomicUsize,
}

impl FakePrices {
    pub fn set(&self, name: &str, price: Option<f64>) {
        let mut p = self.prices.lock().unwrap();
        match price {
            Some(v) => p.insert(name.to_string(), v),
            None => p.remove(name),
        };
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FakePrices {
    async fn fetch_price(&self, _appid: u32, name: &str, _currency: u32) -> Option<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prices.lock().unwrap().get(name).copied()
    }
}

#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub fail: AtomicBool,
}

impl RecordingChat {
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count_for(&self, chat_id: i64) -> usize {
        self.sent().iter().filter(|(c, _)| *c == chat_id).count()
    }
}

#[async_trait]
impl ChatSender for RecordingChat {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Telegram("403: bot was blocked by the user".into()));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

pub fn test_settings(dir: &Path) -> Settings {
    Settings {
        host: "127.0.0.1".into(),
        port: 0,
        log_level: "debug".into(),
        data_dir: dir.to_path_buf(),
        bot_token: String::new(),
        bot_username: "TrackNBuyBot".into(),
        telegram_api_url: "http://127.0.0.1:9".into(),
        steam_base_url: "http://127.0.0.1:9".into(),
        fetch_timeout: Duration::from_secs(2),
        fetch_max_attempts: 3,
        fetch_backoff: Duration::from_millis(1),
        poll_idle: Duration::from_secs(3),
        notify_cooldown_secs: 3600,
        bcrypt_cost: 4,
    }
}

pub struct Harness {
    pub state: AppState,
    pub prices: Arc<FakePrices>,
    pub chat: Arc<RecordingChat>,
    pub dir: tempfile::TempDir,
}

pub async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).await.unwrap();
    harness_with(dir, store, Arc::new(FakePrices::default())).await
}

pub async fn harness_with(
    dir: tempfile::TempDir,
    store: Store,
    prices: Arc<FakePrices>,
) -> Harness {
    let chat = Arc::new(RecordingChat::default());

    let state = AppState {
        hbs: templates::build_handlebars(),
        store: Arc::new(store),
        settings: test_settings(dir.path()),
        prices: prices.clone(),
        chat: chat.clone(),
    };

    Harness {
        state,
        prices,
        chat,
        dir,
    }
}

pub fn account(login: &str, token: &str, chat_id: Option<i64>) -> Account {
    Account {
        login: login.into(),
        token: token.into(),
        pass_hash: String::new(),
        chat_id,
        tg_username: None,
        pair_code: None,
        settings: AccountSettings::default(),
        created_at: 0,
        last_seen_at: None,
        ping_count: 0,
    }
}

pub fn item(id: &str, owner: &str, name: &str, target: f64, direction: Direction) -> TrackedItem {
    TrackedItem {
        id: id.into(),
        owner_token: owner.into(),
        appid: 730,
        market_hash_name: name.into(),
        target_price: target,
        direction,
        enabled: true,
        last_price: None,
        last_checked_at: 0,
        last_notified_at: 0,
        created_at: 0,
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn response_json(res: Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Makes every later write of `name` fail: a non-empty directory can't be
/// renamed over.
pub fn break_document(dir: &Path, name: &str) {
    let path = dir.join(name);
    if path.is_file() {
        std::fs::remove_file(&path).unwrap();
    }
    std::fs::create_dir_all(dir.join(name).join("blocker")).unwrap();
}
