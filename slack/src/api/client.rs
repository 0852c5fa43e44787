use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::common::{FormParams, SlackEnvelope};
use super::error::{ApiError, SlackErrorCode};

pub const DEFAULT_API_URL: &str = "https://slack.com/api/";

/// Slack Web API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    auth_header: String,
    retry_config: RetryConfig,
}

/// Transport-level retry for throttled or unavailable responses.
///
/// This is independent of the operation-level retry used for membership
/// calls; it only covers HTTP 429, 5xx and connection failures.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(api_url: &str, token: &str) -> Result<Self, ApiError> {
        Self::with_config(api_url, token, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        api_url: &str,
        token: &str,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .user_agent(concat!("terraform-provider-slack/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Url::join drops the last path segment unless the base ends with '/'
        let normalized = format!("{}/", api_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", api_url, e)))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", token),
                retry_config,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Conversation (channel) operations
    pub fn conversations(&self) -> super::conversations::ConversationsApi<'_> {
        super::conversations::ConversationsApi::new(self)
    }

    /// User group operations
    pub fn usergroups(&self) -> super::usergroups::UserGroupsApi<'_> {
        super::usergroups::UserGroupsApi::new(self)
    }

    /// User and auth operations
    pub fn users(&self) -> super::users::UsersApi<'_> {
        super::users::UsersApi::new(self)
    }

    /// Invoke a Web API method with form-encoded arguments.
    ///
    /// Fails with `ApiError::Slack` when the envelope says `ok: false`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &FormParams,
    ) -> Result<T, ApiError> {
        let url = self
            .inner
            .base_url
            .join(method)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", method, e)))?;

        let url = &url;
        let text = self
            .execute_with_retry(
                move || async move {
                    tracing::debug!("POST {}", url);

                    self.inner
                        .http_client
                        .post(url.clone())
                        .header(AUTHORIZATION, &self.inner.auth_header)
                        .form(params.as_slice())
                        .send()
                        .await
                },
                method,
            )
            .await?;

        self.parse_envelope(method, &text)
    }

    /// Execute request with retry logic, returning the raw body of the first
    /// successful response
    async fn execute_with_retry<F, Fut>(&self, request_fn: F, method: &str) -> Result<String, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let config = &self.inner.retry_config;
        let mut attempt = 0;
        let mut last_error = None;
        let mut retry_after: Option<Duration> = None;

        while attempt <= config.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(std::cmp::min(
                    config.initial_backoff_ms * (2_u64.pow(attempt - 1)),
                    config.max_backoff_ms,
                ));
                let wait = retry_after.take().unwrap_or(backoff);
                tracing::debug!(
                    "Retrying {} after {}ms (attempt {})",
                    method,
                    wait.as_millis(),
                    attempt
                );
                tokio::time::sleep(wait).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response.text().await?);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        retry_after = response
                            .headers()
                            .get(RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.trim().parse::<u64>().ok())
                            .map(Duration::from_secs);
                        tracing::warn!(
                            "{} rate limited, retry after {:?}",
                            method,
                            retry_after
                        );
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(ApiError::HttpStatus {
                            status: status.as_u16(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(ApiError::Timeout(config.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    fn parse_envelope<T: DeserializeOwned>(&self, method: &str, text: &str) -> Result<T, ApiError> {
        tracing::trace!("{} response body: {}", method, text);

        let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}, body: {}", method, e, text);
            ApiError::ParseError(e.to_string())
        })?;

        let envelope: SlackEnvelope = serde_json::from_value(value.clone())
            .map_err(|e| ApiError::ParseError(e.to_string()))?;

        if !envelope.ok {
            let code = envelope.error.unwrap_or_else(|| "unknown_error".to_string());
            tracing::debug!("{} returned error {}", method, code);
            return Err(ApiError::Slack {
                method: method.to_string(),
                code: SlackErrorCode::from(code.as_str()),
            });
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::error!("Failed to deserialize {} response: {}", method, e);
            ApiError::ParseError(format!("{}: {}", method, e))
        })
    }
}

#[cfg(test)]
pub(crate) fn test_client(url: &str) -> Client {
    Client::with_config(
        url,
        "xoxb-test",
        RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            timeout_seconds: 5,
        },
    )
    .unwrap()
}
