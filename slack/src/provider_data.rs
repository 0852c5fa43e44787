//! Session handed to every resource and data source

use std::sync::Arc;

use crate::api::{AuthIdentity, Client};
use crate::cache::ListCache;
use crate::retry::RetryPolicy;

#[derive(Clone)]
pub struct SlackProviderData {
    pub client: Arc<Client>,
    pub cache: Arc<ListCache>,
    /// Owner of the configured token
    pub auth: AuthIdentity,
    pub retry: RetryPolicy,
}

impl SlackProviderData {
    pub fn new(client: Client, cache: ListCache, auth: AuthIdentity) -> Self {
        Self {
            client: Arc::new(client),
            cache: Arc::new(cache),
            auth,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether `user_id` is the identity behind the token
    pub fn is_self(&self, user_id: &str) -> bool {
        self.auth.user_id == user_id
    }
}
