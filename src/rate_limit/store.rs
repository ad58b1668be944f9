use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// One fixed window for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry {
    /// Requests seen in the current window, including denied ones
    pub count: u64,
    /// Unix milliseconds after which the window is over
    pub reset_at: u64,
}

impl WindowEntry {
    /// Start a window at `now` holding one request
    pub fn fresh(now: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            reset_at: now.saturating_add(window_ms),
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now > self.reset_at
    }
}

/// Storage seam for rate-limit windows
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Read the window stored for a key
    async fn get(&self, key: &str) -> Result<Option<WindowEntry>>;

    /// Overwrite the window for a key
    async fn set(&self, key: &str, entry: WindowEntry) -> Result<()>;

    /// Count one request against `key`, atomically.
    ///
    /// Starts a fresh window when none exists or the stored one expired before
    /// `now`; otherwise increments the stored count. Returns the updated entry.
    async fn hit(&self, key: &str, now: u64, window_ms: u64) -> Result<WindowEntry>;

    /// Forget a key
    async fn remove(&self, key: &str) -> Result<()>;

    /// Drop every window that expired before `now`, returning how many went
    async fn sweep(&self, now: u64) -> Result<usize>;
}

/// Process-local window store
#[derive(Debug, Default)]
pub struct InMemoryWindowStore {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys, expired ones included until the next sweep
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl WindowStore for InMemoryWindowStore {
    async fn get(&self, key: &str) -> Result<Option<WindowEntry>> {
        Ok(self.entries.lock().await.get(key).copied())
    }

    async fn set(&self, key: &str, entry: WindowEntry) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn hit(&self, key: &str, now: u64, window_ms: u64) -> Result<WindowEntry> {
        let mut entries = self.entries.lock().await;

        let entry = entries
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_expired(now) {
                    *entry = WindowEntry::fresh(now, window_ms);
                } else {
                    entry.count = entry.count.saturating_add(1);
                }
            })
            .or_insert_with(|| WindowEntry::fresh(now, window_ms));

        Ok(*entry)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn sweep(&self, now: u64) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }
}
