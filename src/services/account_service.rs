use std::sync::OnceLock;

use bcrypt::{hash, verify};
use chrono::Utc;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
    error::{AppError, Result},
    models::{Account, AccountSettings, Currency, Lang, TrackedItem},
    AppState,
};

pub const MIN_LOGIN_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 4;

fn login_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // logins are Telegram-style handles
    RE.get_or_init(|| Regex::new(r"^@[A-Za-z0-9_]+$").expect("login regex"))
}

pub fn new_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

fn validate_credentials(login: &str, password: &str) -> Result<()> {
    if login.chars().count() < MIN_LOGIN_LEN {
        return Err(AppError::InvalidInput("login is too short"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput("password is too short"));
    }
    if !login_re().is_match(login) {
        return Err(AppError::InvalidInput("login must look like @handle"));
    }
    Ok(())
}

pub async fn register(state: &AppState, login: &str, password: &str) -> Result<()> {
    let login = login.trim();
    validate_credentials(login, password)?;

    let pass_hash = hash(password, state.settings.bcrypt_cost)
        .map_err(|_| AppError::InvalidInput("password can't be hashed"))?;

    let mut db = state.store.lock().await;
    if db.accounts.iter().any(|a| a.login_matches(login)) {
        return Err(AppError::AlreadyExists);
    }

    let mut accounts = db.accounts.clone();
    accounts.push(Account {
        login: login.to_string(),
        token: new_token(),
        pass_hash,
        chat_id: None,
        tg_username: None,
        pair_code: None,
        settings: AccountSettings::default(),
        created_at: Utc::now().timestamp(),
        last_seen_at: None,
        ping_count: 0,
    });
    state.store.commit_accounts(&mut db, accounts).await?;

    info!(login, "account registered");
    Ok(())
}

/// Returns the bearer token for valid credentials.
pub async fn login(state: &AppState, login: &str, password: &str) -> Result<String> {
    let login = login.trim();

    // verify outside the lock, bcrypt is slow on purpose
    let (pass_hash, token) = {
        let db = state.store.lock().await;
        let acc = db
            .accounts
            .iter()
            .find(|a| a.login_matches(login))
            .ok_or(AppError::NotFound)?;
        (acc.pass_hash.clone(), acc.token.clone())
    };

    if !verify(password, &pass_hash).unwrap_or(false) {
        return Err(AppError::WrongPassword);
    }

    if !token.is_empty() {
        return Ok(token);
    }

    let mut db = state.store.lock().await;
    let mut accounts = db.accounts.clone();
    let acc = accounts
        .iter_mut()
        .find(|a| a.login_matches(login))
        .ok_or(AppError::NotFound)?;
    if !acc.token.is_empty() {
        return Ok(acc.token.clone());
    }
    acc.token = new_token();
    let token = acc.token.clone();
    state.store.commit_accounts(&mut db, accounts).await?;

    Ok(token)
}

#[derive(Debug, Clone, Serialize)]
pub struct PairingCode {
    pub code: String,
    pub link: Option<String>,
}

pub async fn start_pairing(state: &AppState, token: &str) -> Result<PairingCode> {
    let mut db = state.store.lock().await;
    if db.account_by_token(token).is_none() {
        return Err(AppError::Unauthenticated);
    }

    // codes must stay unambiguous among accounts still waiting for a chat
    let code = loop {
        let candidate = rand::rng().random_range(100_000..=999_999u32).to_string();
        let taken = db.accounts.iter().any(|a| {
            a.token != token && a.chat_id.is_none() && a.pair_code.as_deref() == Some(&candidate)
        });
        if !taken {
            break candidate;
        }
    };

    let mut accounts = db.accounts.clone();
    if let Some(acc) = accounts.iter_mut().find(|a| a.token == token) {
        acc.pair_code = Some(code.clone());
    }
    state.store.commit_accounts(&mut db, accounts).await?;

    let bot = state.settings.bot_username.trim();
    let link = (!bot.is_empty()).then(|| format!("https://t.me/{bot}?start={code}"));

    Ok(PairingCode { code, link })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    Linked { login: String, lang: Lang },
    InvalidCode,
}

pub async fn redeem_pairing(
    state: &AppState,
    code: &str,
    chat_id: i64,
    display_handle: Option<&str>,
) -> Result<RedeemOutcome> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(RedeemOutcome::InvalidCode);
    }

    let mut db = state.store.lock().await;
    let Some(idx) = db
        .accounts
        .iter()
        .position(|a| a.chat_id.is_none() && a.pair_code.as_deref() == Some(code))
    else {
        return Ok(RedeemOutcome::InvalidCode);
    };

    let mut accounts = db.accounts.clone();

    // a chat belongs to one account; re-pairing moves it
    for other in accounts.iter_mut().filter(|a| a.chat_id == Some(chat_id)) {
        info!(chat_id, login = %other.login, "chat unlinked from previous account");
        other.chat_id = None;
        other.tg_username = None;
    }

    let acc = &mut accounts[idx];
    acc.chat_id = Some(chat_id);
    acc.tg_username = Some(
        display_handle
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(|h| format!("@{}", h.trim_start_matches('@')))
            .unwrap_or_else(|| acc.login.clone()),
    );
    acc.pair_code = None;
    let outcome = RedeemOutcome::Linked {
        login: acc.login.clone(),
        lang: acc.settings.lang,
    };
    state.store.commit_accounts(&mut db, accounts).await?;

    info!(chat_id, "chat linked");
    Ok(outcome)
}

/// Raw settings payload; unknown or invalid values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default, alias = "interval")]
    pub interval_min: Option<Value>,
    #[serde(default, alias = "language")]
    pub lang: Option<Value>,
}

fn coerce_interval(v: &Value) -> Option<u32> {
    let n = match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (n >= 1).then(|| u32::try_from(n).unwrap_or(u32::MAX))
}

pub async fn update_settings(
    state: &AppState,
    token: &str,
    update: &SettingsUpdate,
) -> Result<AccountSettings> {
    let mut db = state.store.lock().await;
    let mut accounts = db.accounts.clone();
    let acc = accounts
        .iter_mut()
        .find(|a| !token.is_empty() && a.token == token)
        .ok_or(AppError::Unauthenticated)?;

    if let Some(c) = update
        .currency
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Currency::from_label)
    {
        acc.settings.currency = c;
    }
    if let Some(m) = update.interval_min.as_ref().and_then(coerce_interval) {
        acc.settings.interval_min = m;
    }
    if let Some(l) = update
        .lang
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Lang::from_tag)
    {
        acc.settings.lang = l;
    }

    let settings = acc.settings.clone();
    state.store.commit_accounts(&mut db, accounts).await?;
    Ok(settings)
}

/// Usage ping from the extension.
pub async fn ping(state: &AppState, token: &str) -> Result<()> {
    let mut db = state.store.lock().await;
    let mut accounts = db.accounts.clone();
    let acc = accounts
        .iter_mut()
        .find(|a| !token.is_empty() && a.token == token)
        .ok_or(AppError::Unauthenticated)?;

    acc.last_seen_at = Some(Utc::now().timestamp());
    acc.ping_count += 1;

    state.store.commit_accounts(&mut db, accounts).await?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub currency: &'static str,
    pub currency_code: u32,
    pub interval_min: u32,
    pub lang: &'static str,
}

impl From<&AccountSettings> for SettingsView {
    fn from(s: &AccountSettings) -> Self {
        Self {
            currency: s.currency.label(),
            currency_code: s.currency.code(),
            interval_min: s.interval_min,
            lang: s.lang.tag(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountState {
    pub login: String,
    pub settings: SettingsView,
    pub paired: bool,
    pub tg_username: Option<String>,
    pub pair_code: Option<String>,
    pub items: Vec<TrackedItem>,
}

pub async fn account_state(state: &AppState, token: &str) -> Result<AccountState> {
    let db = state.store.lock().await;
    let acc = db.account_by_token(token).ok_or(AppError::Unauthenticated)?;

    // same order as the bot's item list
    let mut items: Vec<TrackedItem> = db.items_of(token).cloned().collect();
    items.sort_by_key(|i| i.created_at);

    Ok(AccountState {
        login: acc.login.clone(),
        settings: SettingsView::from(&acc.settings),
        paired: acc.is_paired(),
        tg_username: acc.tg_username.clone(),
        pair_code: acc.pair_code.clone(),
        items,
    })
}
