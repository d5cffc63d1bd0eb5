use serde::{Deserialize, Serialize};

/// Steam wallet currencies a user can pick. The label and the numeric Steam
/// code are one value, so a mismatched pair can't be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gbp,
    Eur,
    #[default]
    Rub,
    Uah,
    Kzt,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Usd,
        Currency::Gbp,
        Currency::Eur,
        Currency::Rub,
        Currency::Uah,
        Currency::Kzt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Rub => "RUB",
            Currency::Uah => "UAH",
            Currency::Kzt => "KZT",
        }
    }

    /// Steam `currency` query parameter.
    pub fn code(self) -> u32 {
        match self {
            Currency::Usd => 1,
            Currency::Gbp => 2,
            Currency::Eur => 3,
            Currency::Rub => 5,
            Currency::Uah => 18,
            Currency::Kzt => 37,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Ru,
    En,
}

impl Lang {
    pub fn tag(self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::En => "en",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "ru" => Some(Lang::Ru),
            "en" => Some(Lang::En),
            _ => None,
        }
    }
}

pub const DEFAULT_INTERVAL_MIN: u32 = 5;

fn default_interval_min() -> u32 {
    DEFAULT_INTERVAL_MIN
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredSettings", into = "StoredSettings")]
pub struct AccountSettings {
    pub currency: Currency,
    // minutes between two price checks of the same item
    pub interval_min: u32,
    pub lang: Lang,
}

/// On-disk shape: the currency is written both as label and Steam code.
/// When reading, the label wins and the code is only a fallback.
#[derive(Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default)]
    currency: Option<Currency>,
    #[serde(default)]
    currency_code: Option<u32>,
    #[serde(default = "default_interval_min")]
    interval_min: u32,
    #[serde(default)]
    lang: Lang,
}

impl From<StoredSettings> for AccountSettings {
    fn from(s: StoredSettings) -> Self {
        let currency = s
            .currency
            .or_else(|| s.currency_code.and_then(Currency::from_code))
            .unwrap_or_default();
        Self {
            currency,
            interval_min: s.interval_min.max(1),
            lang: s.lang,
        }
    }
}

impl From<AccountSettings> for StoredSettings {
    fn from(s: AccountSettings) -> Self {
        Self {
            currency: Some(s.currency),
            currency_code: Some(s.currency.code()),
            interval_min: s.interval_min,
            lang: s.lang,
        }
    }
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            interval_min: DEFAULT_INTERVAL_MIN,
            lang: Lang::default(),
        }
    }
}

impl AccountSettings {
    pub fn interval_secs(&self) -> i64 {
        i64::from(self.interval_min.max(1)) * 60
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub token: String,
    pub pass_hash: String,

    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub tg_username: Option<String>,
    #[serde(default)]
    pub pair_code: Option<String>,

    #[serde(default)]
    pub settings: AccountSettings,

    pub created_at: i64,
    #[serde(default)]
    pub last_seen_at: Option<i64>,
    #[serde(default)]
    pub ping_count: u64,
}

impl Account {
    pub fn login_matches(&self, login: &str) -> bool {
        self.login.to_lowercase() == login.trim().to_lowercase()
    }

    pub fn is_paired(&self) -> bool {
        self.chat_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_label_and_code_travel_together() {
        let c = Currency::from_label("usd").unwrap();
        assert_eq!(c.label(), "USD");
        assert_eq!(c.code(), 1);
        assert_eq!(Currency::from_label("RUB").unwrap().code(), 5);
        assert!(Currency::from_label("BTC").is_none());
    }

    #[test]
    fn settings_fill_defaults_from_sparse_json() {
        let s: AccountSettings = serde_json::from_str(r#"{"currency":"EUR"}"#).unwrap();
        assert_eq!(s.currency, Currency::Eur);
        assert_eq!(s.interval_min, DEFAULT_INTERVAL_MIN);
        assert_eq!(s.lang, Lang::Ru);
    }

    #[test]
    fn settings_are_stored_with_label_and_code() {
        let s = AccountSettings {
            currency: Currency::Uah,
            interval_min: 7,
            lang: Lang::En,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["currency"], "UAH");
        assert_eq!(v["currency_code"], 18);

        let back: AccountSettings = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn currency_code_fills_in_for_a_missing_label() {
        let s: AccountSettings = serde_json::from_str(r#"{"currency_code":3}"#).unwrap();
        assert_eq!(s.currency, Currency::Eur);

        let s: AccountSettings =
            serde_json::from_str(r#"{"currency":"USD","currency_code":5}"#).unwrap();
        assert_eq!(s.currency, Currency::Usd);
    }
}
