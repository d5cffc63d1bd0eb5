use serde_json::Value;
use tracing::{debug, warn};

use crate::{models::Lang, templates::template_name, AppState};

pub fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

/// Renders a chat message template in the user's language.
pub fn render(state: &AppState, lang: Lang, name: &str, ctx: &Value) -> String {
    state
        .hbs
        .render(&template_name(lang, name), ctx)
        .unwrap_or_else(|e| {
            warn!(template = name, error = %e, "message template failed");
            String::new()
        })
}

/// Delivers `text` to a linked chat. Delivery problems are logged and
/// swallowed so one stale chat never blocks anyone else; returns whether the
/// message went out.
pub async fn notify(state: &AppState, chat_id: i64, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }

    match state.chat.send_message(chat_id, text).await {
        Ok(()) => {
            debug!(chat_id, "chat message delivered");
            true
        }
        Err(e) => {
            warn!(chat_id, error = %e, "chat message not delivered");
            false
        }
    }
}
