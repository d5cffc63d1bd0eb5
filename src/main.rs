use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use steamtrack::{
    config, routes,
    services::{
        bot, price_monitor, retry::RetryPolicy, steam_market::SteamMarketClient, store::Store,
        telegram::TelegramClient,
    },
    templates, AppState,
};

#[tokio::main]
async fn main() {
    let settings = config::load();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_level))
        .init();

    let store = match Store::open(&settings.data_dir).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, dir = %settings.data_dir.display(), "failed to load data");
            std::process::exit(1);
        }
    };

    let prices = SteamMarketClient::new(
        settings.steam_base_url.clone(),
        settings.fetch_timeout,
        RetryPolicy::new(settings.fetch_max_attempts, settings.fetch_backoff),
    );
    let telegram = TelegramClient::new(
        settings.telegram_api_url.clone(),
        settings.bot_token.clone(),
    );

    let state = AppState {
        hbs: templates::build_handlebars(),
        store: Arc::new(store),
        settings: settings.clone(),
        prices: Arc::new(prices),
        chat: Arc::new(telegram.clone()),
    };

    price_monitor::spawn_price_monitor(state.clone());
    bot::spawn_bot(state.clone(), telegram);

    let app = routes::app(state);

    let ip = match settings.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(_) => {
            tracing::error!(host = %settings.host, "HOST is not an IP address");
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::from((ip, settings.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };
    tracing::info!("listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
