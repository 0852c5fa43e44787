//! File-backed read-through cache for the rate-limited list endpoints.
//!
//! Each key is a JSON file in the cache directory. An entry is fresh while
//! its modification time is within the TTL of the injected clock's now.
//! Every storage problem (missing directory, unreadable file, corrupt JSON,
//! failed write) degrades to a live call; nothing here is ever surfaced.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

pub const USERS_KEY: &str = "users.json";
pub const USERGROUPS_KEY: &str = "usergroups.json";

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_CACHE_DIR: &str = "./.terraform/plugins/.cache/terraform-provider-slack";

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

pub struct ListCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    /// When each key was last reloaded because a lookup missed
    miss_reloads: Mutex<HashMap<String, SystemTime>>,
}

impl std::fmt::Debug for ListCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListCache")
            .field("dir", &self.dir)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ListCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self::with_clock(dir, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            clock,
            miss_reloads: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key` if fresh, otherwise run `loader`
    /// and store its result. Loader errors are returned untouched and leave
    /// the stored entry as it was.
    pub async fn fetch_or_load<T, E, F, Fut>(&self, key: &str, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.read_fresh(key).await {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }

        tracing::debug!(key, "cache miss, loading");
        self.refresh(key, loader).await
    }

    /// Run `loader` unconditionally and overwrite the entry on success
    pub async fn refresh<T, E, F, Fut>(&self, key: &str, loader: F) -> Result<T, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = loader().await?;
        self.store(key, &value).await;
        Ok(value)
    }

    /// Reload `key` because a lookup missed in the cached snapshot.
    ///
    /// Runs at most once per key per TTL window; later misses in the same
    /// window get `Ok(None)` and should report the entity absent.
    pub async fn reload_on_miss<T, E, F, Fut>(&self, key: &str, loader: F) -> Result<Option<T>, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let now = self.clock.now();
        if let Some(last) = self.last_miss_reload(key) {
            let age = now.duration_since(last).unwrap_or(Duration::ZERO);
            if age <= self.ttl {
                tracing::debug!(
                    key,
                    age_secs = age.as_secs(),
                    "miss reload already done in this window"
                );
                return Ok(None);
            }
        }

        let value = self.refresh(key, loader).await?;
        if let Ok(mut reloads) = self.miss_reloads.lock() {
            reloads.insert(key.to_string(), now);
        }
        Ok(Some(value))
    }

    fn last_miss_reload(&self, key: &str) -> Option<SystemTime> {
        match self.miss_reloads.lock() {
            Ok(reloads) => reloads.get(key).copied(),
            Err(poisoned) => poisoned.into_inner().get(key).copied(),
        }
    }

    async fn read_fresh<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.dir.join(key);

        let metadata = tokio::fs::metadata(&path).await.ok()?;
        let written = metadata.modified().ok()?;
        let age = self
            .clock
            .now()
            .duration_since(written)
            .unwrap_or(Duration::ZERO);
        if age > self.ttl {
            tracing::debug!(key, age_secs = age.as_secs(), "cache entry expired");
            return None;
        }

        let bytes = tokio::fs::read(&path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_store(key, value).await {
            tracing::warn!(key, error = %e, "failed to write cache entry");
        }
    }

    async fn try_store<T: Serialize>(&self, key: &str, value: &T) -> std::io::Result<()> {
        let bytes = serde_json::to_vec(value)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(key);
        tokio::fs::write(&path, bytes).await?;

        // Stamp the entry with the injected clock so expiry follows it
        let file = tokio::fs::OpenOptions::new().write(true).open(&path).await?;
        file.into_std().await.set_modified(self.clock.now())?;
        Ok(())
    }
}
