use std::{env, path::PathBuf, time::Duration};

pub const STEAM_BASE_URL: &str = "https://steamcommunity.com";
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub log_level: String,

    // accounts.json + items.json live here
    pub data_dir: PathBuf,

    pub bot_token: String,
    pub bot_username: String,
    pub telegram_api_url: String,

    pub steam_base_url: String,
    pub fetch_timeout: Duration,
    pub fetch_max_attempts: u32,
    pub fetch_backoff: Duration,

    /// Idle time between two scheduler scans.
    pub poll_idle: Duration,
    /// Minimum gap between two alerts for the same item, in seconds.
    pub notify_cooldown_secs: i64,

    pub bcrypt_cost: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env_or("PORT", 10000u16);
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let data_dir = env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    // the bot was historically deployed with a lowercase `bot_token`
    let bot_token = env::var("bot_token")
        .or_else(|_| env::var("BOT_TOKEN"))
        .unwrap_or_default();
    let bot_username = env::var("BOT_USERNAME")
        .unwrap_or_default()
        .trim_start_matches('@')
        .to_string();
    let telegram_api_url =
        env::var("TELEGRAM_API_URL").unwrap_or_else(|_| TELEGRAM_API_URL.to_string());

    let steam_base_url =
        env::var("STEAM_BASE_URL").unwrap_or_else(|_| STEAM_BASE_URL.to_string());

    Settings {
        host,
        port,
        log_level,
        data_dir,
        bot_token,
        bot_username,
        telegram_api_url,
        steam_base_url,
        fetch_timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 12u64)),
        fetch_max_attempts: env_or("FETCH_MAX_ATTEMPTS", 3u32).max(1),
        fetch_backoff: Duration::from_millis(env_or("FETCH_BACKOFF_MS", 1000u64)),
        poll_idle: Duration::from_secs(env_or("POLL_IDLE_SECS", 3u64).max(1)),
        notify_cooldown_secs: env_or("NOTIFY_COOLDOWN_SECS", 3600i64),
        bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST),
    }
}
