//! Shared fixtures for unit tests

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use crate::api::client::test_client;
use crate::api::AuthIdentity;
use crate::cache::{Clock, ListCache, DEFAULT_TTL};
use crate::provider_data::SlackProviderData;
use crate::retry::RetryPolicy;

pub const BOT_USER_ID: &str = "UBOT";

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Session against a mock server, with a manual clock and millisecond retries
pub fn provider_data(server_url: &str, cache_dir: &Path) -> (SlackProviderData, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = ListCache::with_clock(cache_dir, DEFAULT_TTL, clock.clone());
    let auth = AuthIdentity {
        user_id: BOT_USER_ID.to_string(),
        team_id: "T1".to_string(),
        ..Default::default()
    };

    let data = SlackProviderData::new(test_client(server_url), cache, auth)
        .with_retry(RetryPolicy::new(3, Duration::from_millis(1)));
    (data, clock)
}
