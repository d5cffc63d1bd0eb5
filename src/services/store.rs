use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::{
    error::Result,
    models::{Account, TrackedItem},
};

use super::persist;

/// Authoritative in-memory state. Only reachable through `Store::lock`.
#[derive(Debug, Default, Clone)]
pub struct StoreData {
    pub accounts: Vec<Account>,
    pub items: Vec<TrackedItem>,
}

impl StoreData {
    pub fn account_by_token(&self, token: &str) -> Option<&Account> {
        if token.is_empty() {
            return None;
        }
        self.accounts.iter().find(|a| a.token == token)
    }

    pub fn account_by_chat(&self, chat_id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.chat_id == Some(chat_id))
    }

    pub fn items_of<'a>(&'a self, token: &'a str) -> impl Iterator<Item = &'a TrackedItem> + 'a {
        self.items.iter().filter(move |i| i.owner_token == token)
    }
}

#[derive(Debug, Clone)]
struct StoreFiles {
    accounts: PathBuf,
    items: PathBuf,
}

/// One lock over accounts and items, plus the two JSON documents behind them.
pub struct Store {
    data: Mutex<StoreData>,
    files: Option<StoreFiles>,
}

impl Store {
    /// Not backed by disk; `save_*` are no-ops.
    pub fn in_memory() -> Self {
        Self {
            data: Mutex::new(StoreData::default()),
            files: None,
        }
    }

    pub async fn open(dir: &Path) -> Result<Self> {
        let files = StoreFiles {
            accounts: dir.join("accounts.json"),
            items: dir.join("items.json"),
        };

        let accounts: Vec<Account> = persist::load_json(&files.accounts).await?;
        let items: Vec<TrackedItem> = persist::load_json(&files.items).await?;
        info!(
            accounts = accounts.len(),
            items = items.len(),
            dir = %dir.display(),
            "store loaded"
        );

        Ok(Self {
            data: Mutex::new(StoreData { accounts, items }),
            files: Some(files),
        })
    }

    pub async fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().await
    }

    /// Point-in-time copy for work that must not hold the lock.
    pub async fn snapshot(&self) -> StoreData {
        self.lock().await.clone()
    }

    async fn write_accounts(&self, accounts: &[Account]) -> Result<()> {
        match &self.files {
            Some(f) => persist::write_json_atomic(&f.accounts, &accounts).await,
            None => Ok(()),
        }
    }

    async fn write_items(&self, items: &[TrackedItem]) -> Result<()> {
        match &self.files {
            Some(f) => persist::write_json_atomic(&f.items, &items).await,
            None => Ok(()),
        }
    }

    /// Writes `accounts` to disk, then installs it as the live collection.
    /// A failed write leaves `data` exactly as it was.
    pub async fn commit_accounts(&self, data: &mut StoreData, accounts: Vec<Account>) -> Result<()> {
        self.write_accounts(&accounts).await?;
        data.accounts = accounts;
        Ok(())
    }

    /// Same contract as `commit_accounts`, for items.
    pub async fn commit_items(&self, data: &mut StoreData, items: Vec<TrackedItem>) -> Result<()> {
        self.write_items(&items).await?;
        data.items = items;
        Ok(())
    }

    /// Flushes the in-memory items as they are.
    pub async fn save_items(&self, data: &StoreData) -> Result<()> {
        self.write_items(&data.items).await
    }
}
