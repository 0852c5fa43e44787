//! Terraform provider for Slack.
//!
//! Conversations, their members, user groups and user lookups are mapped
//! onto the Slack Web API. Configure authenticates the token once and builds
//! the [`SlackProviderData`] session every resource and data source receives.

pub mod api;
pub mod cache;
pub mod data_sources;
pub mod logging;
pub mod lookup;
pub mod provider_data;
pub mod reconcile;
pub mod resources;
pub mod retry;

#[cfg(test)]
mod test_helpers;

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, ConfigureProviderResponse, Provider};
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Config, Diagnostic};
use tfplug::{DataSource, Resource, TfplugError};
use tracing::Instrument;

pub use provider_data::SlackProviderData;

use cache::{ListCache, DEFAULT_CACHE_DIR, DEFAULT_TTL};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct SlackProvider {
    data: Option<SlackProviderData>,
}

impl Default for SlackProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SlackProvider {
    pub fn new() -> Self {
        Self { data: None }
    }

    pub fn is_configured(&self) -> bool {
        self.data.is_some()
    }

    fn session(&self) -> tfplug::Result<SlackProviderData> {
        self.data.clone().ok_or(TfplugError::ProviderNotConfigured)
    }
}

/// Non-empty config value, falling back to the environment
fn config_string(config: &Config, attr: &str, env: &str) -> Option<String> {
    config
        .get_string(&AttributePath::new(attr))
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
}

/// Cache TTL from config; absent means the default
fn cache_ttl(config: &Config) -> Result<Duration, Diagnostic> {
    let Ok(seconds) = config.get_number(&AttributePath::new("cache_ttl_seconds")) else {
        return Ok(DEFAULT_TTL);
    };
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        Diagnostic::error(
            "Invalid cache_ttl_seconds",
            format!("{seconds} is not a usable number of seconds: {e}"),
        )
        .with_attribute(AttributePath::new("cache_ttl_seconds"))
    })
}

/// Resolve settings, authenticate the token and build the session
async fn open_session(config: &Config) -> Result<SlackProviderData, Diagnostic> {
    let Some(token) = config_string(config, "token", "SLACK_TOKEN") else {
        return Err(Diagnostic::error(
            "token is required",
            "Set token in the provider block or the SLACK_TOKEN environment variable",
        )
        .with_attribute(AttributePath::new("token")));
    };
    let api_url = config_string(config, "api_url", "SLACK_API_URL")
        .unwrap_or_else(|| api::DEFAULT_API_URL.to_string());
    let cache_dir = config_string(config, "cache_dir", "SLACK_CACHE_DIR")
        .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string());
    let ttl = cache_ttl(config)?;

    let client = api::Client::new(&api_url, &token).map_err(|e| {
        Diagnostic::error("Failed to create API client", e.to_string())
            .with_attribute(AttributePath::new("api_url"))
    })?;

    let auth = client.users().auth_test().await.map_err(|e| {
        tracing::error!(error = %e, "token rejected");
        Diagnostic::error("Could not authorize with given token", e.to_string())
    })?;

    tracing::info!(team = %auth.team, user_id = %auth.user_id, "authenticated");
    let cache = ListCache::new(cache_dir, ttl);
    Ok(SlackProviderData::new(client, cache, auth))
}

#[async_trait]
impl Provider for SlackProvider {
    fn type_name(&self) -> &str {
        logging::PROVIDER_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Slack provider")
            .attribute(
                AttributeBuilder::string("token")
                    .description("OAuth token (or SLACK_TOKEN)")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("api_url")
                    .description("Web API base URL (or SLACK_API_URL)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("cache_dir")
                    .description("Directory for cached user and usergroup lists (or SLACK_CACHE_DIR)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::number("cache_ttl_seconds")
                    .description("How long cached lists stay fresh")
                    .optional()
                    .build(),
            )
            .build()
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let span = logging::provider_span(VERSION, option_env!("GIT_COMMIT").unwrap_or("dev"));

        match open_session(&request.config).instrument(span).await {
            Ok(data) => {
                self.data = Some(data);
                ConfigureProviderResponse {
                    diagnostics: vec![],
                }
            }
            Err(diagnostic) => ConfigureProviderResponse {
                diagnostics: vec![diagnostic],
            },
        }
    }

    fn create_resource(&self, type_name: &str) -> tfplug::Result<Box<dyn Resource>> {
        let data = self.session()?;

        match type_name {
            resources::conversation::TYPE_NAME => {
                Ok(Box::new(resources::ConversationResource::new(data)))
            }
            resources::conversation_member::TYPE_NAME => {
                Ok(Box::new(resources::ConversationMemberResource::new(data)))
            }
            resources::usergroup::TYPE_NAME => Ok(Box::new(resources::UserGroupResource::new(data))),
            resources::usergroup_members::TYPE_NAME => {
                Ok(Box::new(resources::UserGroupMembersResource::new(data)))
            }
            resources::usergroup_channels::TYPE_NAME => {
                Ok(Box::new(resources::UserGroupChannelsResource::new(data)))
            }
            _ => Err(TfplugError::ResourceNotFound(type_name.to_string())),
        }
    }

    fn create_data_source(&self, type_name: &str) -> tfplug::Result<Box<dyn DataSource>> {
        let data = self.session()?;

        match type_name {
            data_sources::user::TYPE_NAME => Ok(Box::new(data_sources::UserDataSource::new(data))),
            data_sources::usergroup::TYPE_NAME => {
                Ok(Box::new(data_sources::UserGroupDataSource::new(data)))
            }
            data_sources::conversation::TYPE_NAME => {
                Ok(Box::new(data_sources::ConversationDataSource::new(data)))
            }
            _ => Err(TfplugError::DataSourceNotFound(type_name.to_string())),
        }
    }

    fn resource_schemas(&self) -> HashMap<String, Schema> {
        HashMap::from([
            (
                resources::conversation::TYPE_NAME.to_string(),
                resources::ConversationResource::schema_static(),
            ),
            (
                resources::conversation_member::TYPE_NAME.to_string(),
                resources::ConversationMemberResource::schema_static(),
            ),
            (
                resources::usergroup::TYPE_NAME.to_string(),
                resources::UserGroupResource::schema_static(),
            ),
            (
                resources::usergroup_members::TYPE_NAME.to_string(),
                resources::UserGroupMembersResource::schema_static(),
            ),
            (
                resources::usergroup_channels::TYPE_NAME.to_string(),
                resources::UserGroupChannelsResource::schema_static(),
            ),
        ])
    }

    fn data_source_schemas(&self) -> HashMap<String, Schema> {
        HashMap::from([
            (
                data_sources::user::TYPE_NAME.to_string(),
                data_sources::UserDataSource::schema_static(),
            ),
            (
                data_sources::usergroup::TYPE_NAME.to_string(),
                data_sources::UserGroupDataSource::schema_static(),
            ),
            (
                data_sources::conversation::TYPE_NAME.to_string(),
                data_sources::ConversationDataSource::schema_static(),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serial_test::serial;
    use tfplug::types::DynamicValue;

    fn config(api_url: &str, cache_dir: &std::path::Path) -> DynamicValue {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("api_url"), api_url)
            .unwrap();
        config
            .set_string(&AttributePath::new("cache_dir"), cache_dir.to_string_lossy())
            .unwrap();
        config
    }

    #[tokio::test]
    #[serial]
    async fn configure_authenticates_with_env_token() {
        let mut server = Server::new_async().await;
        let auth = server
            .mock("POST", "/auth.test")
            .match_header("authorization", "Bearer xoxb-env")
            .with_body(r#"{"ok":true,"user_id":"UBOT","team_id":"T1","team":"acme"}"#)
            .expect(1)
            .create_async()
            .await;

        std::env::set_var("SLACK_TOKEN", "xoxb-env");
        let dir = tempfile::tempdir().unwrap();
        let mut provider = SlackProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "1.9.0".to_string(),
                    config: config(&server.url(), dir.path()),
                },
            )
            .await;
        std::env::remove_var("SLACK_TOKEN");

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert!(provider.is_configured());
        let data = provider.session().unwrap();
        assert!(data.is_self("UBOT"));
        assert_eq!(data.cache.dir(), dir.path());
        auth.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn configure_requires_token() {
        std::env::remove_var("SLACK_TOKEN");
        let dir = tempfile::tempdir().unwrap();

        let mut provider = SlackProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "1.9.0".to_string(),
                    config: config("http://127.0.0.1:1", dir.path()),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "token is required");
        assert!(!provider.is_configured());
    }

    #[tokio::test]
    #[serial]
    async fn configure_reports_rejected_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth.test")
            .match_body(Matcher::Any)
            .with_body(r#"{"ok":false,"error":"invalid_auth"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(&server.url(), dir.path());
        cfg.set_string(&AttributePath::new("token"), "xoxb-bad").unwrap();

        let mut provider = SlackProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "1.9.0".to_string(),
                    config: cfg,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].summary,
            "Could not authorize with given token"
        );
        assert!(!provider.is_configured());
    }

    #[test]
    fn unconfigured_provider_refuses_to_build_resources() {
        let provider = SlackProvider::new();
        assert!(matches!(
            provider.create_resource("slack_conversation"),
            Err(TfplugError::ProviderNotConfigured)
        ));
    }

    #[test]
    fn schemas_are_available_before_configure() {
        let provider = SlackProvider::new();
        let resources = provider.resource_schemas();
        assert_eq!(resources.len(), 5);
        assert!(resources["slack_usergroup_members"]
            .attribute("usergroup_id")
            .unwrap()
            .required);

        let data_sources = provider.data_source_schemas();
        assert_eq!(data_sources.len(), 3);
        assert!(data_sources.contains_key("slack_user"));
    }

    #[test]
    fn provider_schema_marks_token_sensitive() {
        let schema = SlackProvider::new().schema();
        assert!(schema.attribute("token").unwrap().sensitive);
    }

    async fn configure_with_ttl(seconds: f64) -> (SlackProvider, ConfigureProviderResponse) {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config("http://127.0.0.1:1", dir.path());
        cfg.set_string(&AttributePath::new("token"), "xoxb-test").unwrap();
        cfg.set_number(&AttributePath::new("cache_ttl_seconds"), seconds)
            .unwrap();

        let mut provider = SlackProvider::new();
        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    terraform_version: "1.9.0".to_string(),
                    config: cfg,
                },
            )
            .await;
        (provider, response)
    }

    #[tokio::test]
    #[serial]
    async fn huge_cache_ttl_is_a_config_error() {
        let (provider, response) = configure_with_ttl(1e20).await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Invalid cache_ttl_seconds");
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("cache_ttl_seconds"))
        );
        assert!(!provider.is_configured());
    }

    #[tokio::test]
    #[serial]
    async fn infinite_cache_ttl_is_a_config_error() {
        let (provider, response) = configure_with_ttl(f64::INFINITY).await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("cache_ttl_seconds"))
        );
        assert!(!provider.is_configured());
    }

    #[tokio::test]
    #[serial]
    async fn negative_cache_ttl_is_a_config_error() {
        let (provider, response) = configure_with_ttl(-5.0).await;

        assert_eq!(response.diagnostics[0].summary, "Invalid cache_ttl_seconds");
        assert!(!provider.is_configured());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[serial]
    async fn configure_runs_on_a_multi_thread_runtime() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth.test")
            .match_body(Matcher::Any)
            .with_body(r#"{"ok":true,"user_id":"UBOT","team_id":"T1","team":"acme"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(&server.url(), dir.path());
        cfg.set_string(&AttributePath::new("token"), "xoxb-test").unwrap();
        cfg.set_number(&AttributePath::new("cache_ttl_seconds"), 5.0)
            .unwrap();

        // The configure future must be Send to move onto a worker thread
        let handle = tokio::spawn(async move {
            let mut provider = SlackProvider::new();
            let response = provider
                .configure(
                    Context::new(),
                    ConfigureProviderRequest {
                        terraform_version: "1.9.0".to_string(),
                        config: cfg,
                    },
                )
                .await;
            (provider, response)
        });
        let (provider, response) = handle.await.unwrap();

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(provider.session().unwrap().cache.ttl(), Duration::from_secs(5));
    }
}
