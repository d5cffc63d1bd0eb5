mod common;

use std::sync::Arc;

use axum::{body::Body, http::{Request, StatusCode}};
use common::{break_document, harness, harness_with, item, json_request, response_json, FakePrices};
use serde_json::json;
use steamtrack::{
    error::AppError,
    models::{Currency, Direction, Lang},
    routes,
    services::{
        account_service::{self, RedeemOutcome, SettingsUpdate},
        store::Store,
    },
};
use tower::ServiceExt;

async fn registered(h: &common::Harness, login: &str) -> String {
    account_service::register(&h.state, login, "secret").await.unwrap();
    account_service::login(&h.state, login, "secret").await.unwrap()
}

#[tokio::test]
async fn pairing_code_is_redeemable_exactly_once() {
    let h = harness().await;
    let token = registered(&h, "@neo").await;

    let pairing = account_service::start_pairing(&h.state, &token).await.unwrap();
    assert_eq!(pairing.code.len(), 6);
    assert!(pairing.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(
        pairing.link.as_deref(),
        Some(format!("https://t.me/TrackNBuyBot?start={}", pairing.code).as_str())
    );

    let first = account_service::redeem_pairing(&h.state, &pairing.code, 4242, Some("neo_tg"))
        .await
        .unwrap();
    assert_eq!(
        first,
        RedeemOutcome::Linked { login: "@neo".into(), lang: Lang::Ru }
    );

    let again = account_service::redeem_pairing(&h.state, &pairing.code, 4242, Some("neo_tg"))
        .await
        .unwrap();
    assert_eq!(again, RedeemOutcome::InvalidCode);

    let s = account_service::account_state(&h.state, &token).await.unwrap();
    assert!(s.paired);
    assert_eq!(s.tg_username.as_deref(), Some("@neo_tg"));
    assert_eq!(s.pair_code, None);
}

#[tokio::test]
async fn new_pairing_request_replaces_previous_code() {
    let h = harness().await;
    let token = registered(&h, "@trinity").await;

    let old = account_service::start_pairing(&h.state, &token).await.unwrap();
    let mut new = account_service::start_pairing(&h.state, &token).await.unwrap();
    while new.code == old.code {
        new = account_service::start_pairing(&h.state, &token).await.unwrap();
    }

    let stale = account_service::redeem_pairing(&h.state, &old.code, 1, None).await.unwrap();
    assert_eq!(stale, RedeemOutcome::InvalidCode);

    let ok = account_service::redeem_pairing(&h.state, &new.code, 1, None).await.unwrap();
    assert!(matches!(ok, RedeemOutcome::Linked { .. }));

    // no chat handle: falls back to the login
    let s = account_service::account_state(&h.state, &token).await.unwrap();
    assert_eq!(s.tg_username.as_deref(), Some("@trinity"));
}

#[tokio::test]
async fn start_pairing_with_unknown_token_is_unauthenticated() {
    let h = harness().await;
    let err = account_service::start_pairing(&h.state, "deadbeef").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));

    let err = account_service::start_pairing(&h.state, "").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn settings_update_keeps_currency_pair_and_ignores_bad_interval() {
    let h = harness().await;
    let token = registered(&h, "@morpheus").await;

    let update: SettingsUpdate =
        serde_json::from_value(json!({"currency": "usd", "interval_min": "15", "lang": "en"})).unwrap();
    let s = account_service::update_settings(&h.state, &token, &update).await.unwrap();
    assert_eq!(s.currency, Currency::Usd);
    assert_eq!(s.currency.code(), 1);
    assert_eq!(s.interval_min, 15);
    assert_eq!(s.lang, Lang::En);

    let update: SettingsUpdate =
        serde_json::from_value(json!({"currency": "DOGE", "interval_min": 0, "lang": "de"})).unwrap();
    let s = account_service::update_settings(&h.state, &token, &update).await.unwrap();
    assert_eq!(s.currency, Currency::Usd);
    assert_eq!(s.interval_min, 15);
    assert_eq!(s.lang, Lang::En);
}

#[tokio::test]
async fn settings_endpoint_reports_label_and_code() {
    let h = harness().await;
    let token = registered(&h, "@tank").await;
    let app = routes::app(h.state.clone());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/settings",
            json!({"token": token, "currency": "EUR", "interval": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_json(res).await;
    assert_eq!(body["settings"]["currency"], "EUR");
    assert_eq!(body["settings"]["currency_code"], 3);
    assert_eq!(body["settings"]["interval_min"], 2);

    let req = Request::builder()
        .uri(format!("/api/state?token={token}"))
        .body(Body::empty())
        .unwrap();
    let body = response_json(app.oneshot(req).await.unwrap()).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["login"], "@tank");
    assert_eq!(body["paired"], false);
    assert_eq!(body["settings"]["currency"], "EUR");
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn ping_accepts_query_token() {
    let h = harness().await;
    let token = registered(&h, "@dozer").await;
    let app = routes::app(h.state.clone());

    let res = app
        .oneshot(json_request("POST", &format!("/api/ping?token={token}"), json!({})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let db = h.state.store.lock().await;
    let acc = db.account_by_token(&token).unwrap();
    assert_eq!(acc.ping_count, 1);
    assert!(acc.last_seen_at.is_some());
}

#[tokio::test]
async fn accounts_survive_a_restart() {
    let h = harness().await;
    let token = registered(&h, "@apoc").await;
    let code = account_service::start_pairing(&h.state, &token).await.unwrap().code;

    let reopened = Store::open(h.dir.path()).await.unwrap();
    let h2 = harness_with(h.dir, reopened, Arc::new(FakePrices::default())).await;

    let token2 = account_service::login(&h2.state, "@APOC", "secret").await.unwrap();
    assert_eq!(token2, token);

    let s = account_service::account_state(&h2.state, &token).await.unwrap();
    assert_eq!(s.pair_code.as_deref(), Some(code.as_str()));
}

#[tokio::test]
async fn failed_write_leaves_no_account_behind() {
    let h = harness().await;
    break_document(h.dir.path(), "accounts.json");

    let err = account_service::register(&h.state, "@neo", "secret").await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));

    // the retry sees the same state as the first attempt
    let err = account_service::register(&h.state, "@neo", "secret").await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));

    let err = account_service::login(&h.state, "@neo", "secret").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn failed_write_keeps_previous_settings_and_pairing() {
    let h = harness().await;
    let token = registered(&h, "@switch").await;
    break_document(h.dir.path(), "accounts.json");

    let update: SettingsUpdate =
        serde_json::from_value(json!({"currency": "USD", "interval_min": 30})).unwrap();
    let err = account_service::update_settings(&h.state, &token, &update).await.unwrap_err();
    assert_eq!(err.code(), "persistence_failure");

    let err = account_service::start_pairing(&h.state, &token).await.unwrap_err();
    assert_eq!(err.code(), "persistence_failure");

    let err = account_service::ping(&h.state, &token).await.unwrap_err();
    assert_eq!(err.code(), "persistence_failure");

    let s = account_service::account_state(&h.state, &token).await.unwrap();
    assert_eq!(s.settings.currency, "RUB");
    assert_eq!(s.settings.interval_min, 5);
    assert_eq!(s.pair_code, None);

    let db = h.state.store.lock().await;
    assert_eq!(db.account_by_token(&token).unwrap().ping_count, 0);
}

#[tokio::test]
async fn relinking_a_chat_moves_it_to_the_new_account() {
    let h = harness().await;
    let neo = registered(&h, "@neo").await;
    let tri = registered(&h, "@tri").await;

    let code = account_service::start_pairing(&h.state, &neo).await.unwrap().code;
    account_service::redeem_pairing(&h.state, &code, 42, None).await.unwrap();

    let code = account_service::start_pairing(&h.state, &tri).await.unwrap().code;
    let outcome = account_service::redeem_pairing(&h.state, &code, 42, None).await.unwrap();
    assert!(matches!(outcome, RedeemOutcome::Linked { ref login, .. } if login == "@tri"));

    let db = h.state.store.lock().await;
    let linked: Vec<&str> = db
        .accounts
        .iter()
        .filter(|a| a.chat_id == Some(42))
        .map(|a| a.login.as_str())
        .collect();
    assert_eq!(linked, vec!["@tri"]);
    assert!(!db.account_by_token(&neo).unwrap().is_paired());
    assert_eq!(db.account_by_token(&neo).unwrap().tg_username, None);
}

#[tokio::test]
async fn state_lists_items_oldest_first() {
    let h = harness().await;
    let token = registered(&h, "@niobe").await;
    {
        let mut db = h.state.store.lock().await;
        let mut newer = item("b", &token, "Kilowatt Case", 1.0, Direction::Buy);
        newer.created_at = 200;
        let mut older = item("a", &token, "Recoil Case", 1.0, Direction::Buy);
        older.created_at = 100;
        db.items = vec![newer, older];
    }

    let s = account_service::account_state(&h.state, &token).await.unwrap();
    let ids: Vec<&str> = s.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}
