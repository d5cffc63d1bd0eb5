use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Notify once the price falls to or below the target.
    Buy,
    /// Notify once the price rises to or above the target.
    Sell,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Some(Direction::Buy),
            "sell" => Some(Direction::Sell),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }

    pub fn is_hit(self, price: f64, target: f64) -> bool {
        match self {
            Direction::Buy => price <= target,
            Direction::Sell => price >= target,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedItem {
    pub id: String,

    // (owner_token, appid, market_hash_name) is unique
    pub owner_token: String,
    pub appid: u32,
    pub market_hash_name: String,

    pub target_price: f64,
    pub direction: Direction,
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub last_checked_at: i64,
    #[serde(default)]
    pub last_notified_at: i64,

    pub created_at: i64,
}

fn default_enabled() -> bool {
    true
}

impl TrackedItem {
    pub fn same_target(&self, owner_token: &str, appid: u32, market_hash_name: &str) -> bool {
        self.owner_token == owner_token
            && self.appid == appid
            && self.market_hash_name == market_hash_name
    }
}
