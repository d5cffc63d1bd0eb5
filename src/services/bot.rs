use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::Result,
    models::Lang,
    AppState,
};

use super::{
    account_service::{self, RedeemOutcome},
    notifier::{self, fmt2},
    telegram::{Message, TelegramClient},
};

/// Chat commands the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(Option<String>),
    Items,
    Other,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let mut parts = text.trim().splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or_default();
        // "/items@MyTrackBot" in group chats
        let cmd = head.split('@').next().unwrap_or_default().to_lowercase();
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match cmd.as_str() {
            "/start" => Command::Start(arg),
            "/items" | "/list" => Command::Items,
            _ => Command::Other,
        }
    }
}

/// Computes the reply for one incoming chat message.
pub async fn handle_command(
    state: &AppState,
    chat_id: i64,
    username: Option<&str>,
    text: &str,
) -> Result<String> {
    let linked = {
        let db = state.store.lock().await;
        db.account_by_chat(chat_id)
            .map(|a| (a.login.clone(), a.token.clone(), a.settings.clone()))
    };
    let lang = linked.as_ref().map(|(_, _, s)| s.lang).unwrap_or(Lang::Ru);

    let reply = match Command::parse(text) {
        Command::Start(Some(code)) => {
            match account_service::redeem_pairing(state, &code, chat_id, username).await? {
                RedeemOutcome::Linked { login, lang } => {
                    notifier::render(state, lang, "paired", &json!({ "login": login }))
                }
                RedeemOutcome::InvalidCode => {
                    notifier::render(state, lang, "pair_invalid", &json!({}))
                }
            }
        }
        Command::Start(None) => {
            let login = linked.as_ref().map(|(l, _, _)| l.clone());
            notifier::render(state, lang, "greeting", &json!({ "login": login }))
        }
        Command::Items => match &linked {
            None => notifier::render(state, lang, "greeting", &json!({})),
            Some((_, token, settings)) => {
                let items = super::tracking_service::list(state, token).await?;
                if items.is_empty() {
                    notifier::render(state, lang, "items_empty", &json!({}))
                } else {
                    let currency = settings.currency.label();
                    let rows: Vec<serde_json::Value> = items
                        .iter()
                        .enumerate()
                        .map(|(n, i)| {
                            json!({
                                "n": n + 1,
                                "name": i.market_hash_name,
                                "price": i.last_price.map(fmt2),
                                "target": fmt2(i.target_price),
                                "currency": currency,
                                "direction": i.direction.as_str(),
                                "enabled": i.enabled,
                            })
                        })
                        .collect();
                    notifier::render(state, lang, "items_list", &json!({ "items": rows }))
                }
            }
        },
        Command::Other => notifier::render(state, lang, "help", &json!({})),
    };

    Ok(reply)
}

async fn handle_message(state: &AppState, msg: &Message) {
    let Some(text) = msg.text.as_deref() else {
        return;
    };
    let chat_id = msg.chat.id;
    let username = msg.from.as_ref().and_then(|u| u.username.as_deref());

    match handle_command(state, chat_id, username, text).await {
        Ok(reply) => {
            notifier::notify(state, chat_id, &reply).await;
        }
        Err(e) => warn!(chat_id, error = %e, "chat command failed"),
    }
}

/// Long-polls Telegram for commands until the process exits.
pub fn spawn_bot(state: AppState, client: TelegramClient) {
    if !client.has_token() {
        warn!("bot_token is not set, chat commands are disabled");
        return;
    }

    tokio::spawn(async move {
        info!("telegram bot polling started");
        let mut offset = 0i64;

        loop {
            let updates = match client.get_updates(offset).await {
                Ok(u) => u,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, retrying in 5s");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(msg) = &update.message {
                    handle_message(&state, msg).await;
                }
            }
        }
    });
}
