use handlebars::Handlebars;
use std::sync::Arc;

use crate::models::Lang;

pub type Hbs = Arc<Handlebars<'static>>;

// (name, ru, en)
const MESSAGES: &[(&str, &str, &str)] = &[
    (
        "greeting",
        "Привет! Нажми Start через ссылку из расширения 🙂{{#if login}}\nЧат уже привязан к аккаунту {{login}}.{{/if}}",
        "Hi! Press Start via the link from the extension 🙂{{#if login}}\nThis chat is already linked to {{login}}.{{/if}}",
    ),
    (
        "paired",
        "✅ Steam Track n Buy подключён ({{login}}).\nТеперь уведомления будут приходить сюда.",
        "✅ Steam Track n Buy is connected ({{login}}).\nNotifications will arrive here from now on.",
    ),
    (
        "pair_invalid",
        "❌ Код недействителен или уже использован. Получи новый код в расширении.",
        "❌ This code is invalid or already used. Get a new one from the extension.",
    ),
    (
        "help",
        "Команды:\n/items — отслеживаемые предметы\n/start <код> — привязать чат",
        "Commands:\n/items — tracked items\n/start <code> — link this chat",
    ),
    (
        "items_empty",
        "Пока ничего не отслеживается.",
        "Nothing is tracked yet.",
    ),
    (
        "items_list",
        "📋 Отслеживаемые предметы:\n{{#each items}}\n{{n}}. {{name}}\n   сейчас: {{#if price}}{{price}} {{currency}}{{else}}—{{/if}} | цель: {{target}} {{currency}} | {{#if (eq direction \"buy\")}}покупка ≤{{else}}продажа ≥{{/if}}{{#unless enabled}} (выкл){{/unless}}\n{{/each}}",
        "📋 Tracked items:\n{{#each items}}\n{{n}}. {{name}}\n   now: {{#if price}}{{price}} {{currency}}{{else}}—{{/if}} | target: {{target}} {{currency}} | {{#if (eq direction \"buy\")}}buy ≤{{else}}sell ≥{{/if}}{{#unless enabled}} (off){{/unless}}\n{{/each}}",
    ),
    (
        "track_started",
        "👀 Отслеживаю: {{name}}\nЦена сейчас: {{#if price}}{{price}} {{currency}}{{else}}неизвестна{{/if}}\nЦель: {{target}} {{currency}} ({{#if (eq direction \"buy\")}}покупка{{else}}продажа{{/if}})\n{{#if (eq advisory \"price_unknown\")}}Цена пока недоступна, проверю позже.{{/if}}{{#if (eq advisory \"target_reached\")}}Цель уже достигнута.{{/if}}{{#if (eq advisory \"waiting_for_drop\")}}Жду снижения цены.{{/if}}{{#if (eq advisory \"waiting_for_rise\")}}Жду роста цены.{{/if}}",
        "👀 Tracking: {{name}}\nPrice now: {{#if price}}{{price}} {{currency}}{{else}}unknown{{/if}}\nTarget: {{target}} {{currency}} ({{direction}})\n{{#if (eq advisory \"price_unknown\")}}Price is not available yet, will check later.{{/if}}{{#if (eq advisory \"target_reached\")}}Target already reached.{{/if}}{{#if (eq advisory \"waiting_for_drop\")}}Waiting for the price to drop.{{/if}}{{#if (eq advisory \"waiting_for_rise\")}}Waiting for the price to rise.{{/if}}",
    ),
    (
        "price_alert",
        "🔔 {{name}}\n{{#if (eq direction \"buy\")}}Цена упала до{{else}}Цена выросла до{{/if}} {{price}} {{currency}} (цель {{target}} {{currency}}).",
        "🔔 {{name}}\n{{#if (eq direction \"buy\")}}Price dropped to{{else}}Price rose to{{/if}} {{price}} {{currency}} (target {{target}} {{currency}}).",
    ),
];

pub fn template_name(lang: Lang, name: &str) -> String {
    format!("{}/{}", lang.tag(), name)
}

pub fn build_handlebars() -> Hbs {
    let mut hb = Handlebars::new();

    // chat messages are plain text
    hb.register_escape_fn(handlebars::no_escape);
    hb.set_strict_mode(false);

    for (name, ru, en) in MESSAGES {
        hb.register_template_string(&template_name(Lang::Ru, name), ru)
            .expect("ru message template");
        hb.register_template_string(&template_name(Lang::En, name), en)
            .expect("en message template");
    }

    Arc::new(hb)
}
