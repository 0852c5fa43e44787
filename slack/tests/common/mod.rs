#![allow(dead_code)]

use std::path::Path;

use mockito::ServerGuard;
use slack::SlackProvider;
use tfplug::context::Context;
use tfplug::provider::{ConfigureProviderRequest, Provider};
use tfplug::types::{AttributePath, DynamicValue};

pub const BOT_USER_ID: &str = "UBOT";

/// Provider configured against `server`, with the auth.test mock removed
/// again so later expectations only see resource traffic.
pub async fn configured_provider(server: &mut ServerGuard, cache_dir: &Path) -> SlackProvider {
    let auth = server
        .mock("POST", "/auth.test")
        .with_body(format!(
            r#"{{"ok":true,"user_id":"{}","team_id":"T1","team":"acme"}}"#,
            BOT_USER_ID
        ))
        .create_async()
        .await;

    let mut config = DynamicValue::object();
    config
        .set_string(&AttributePath::new("token"), "xoxb-test")
        .unwrap();
    config
        .set_string(&AttributePath::new("api_url"), server.url())
        .unwrap();
    config
        .set_string(&AttributePath::new("cache_dir"), cache_dir.to_string_lossy())
        .unwrap();

    let mut provider = SlackProvider::new();
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config,
            },
        )
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

    auth.remove_async().await;
    provider
}

pub fn object(pairs: &[(&str, &str)]) -> DynamicValue {
    let mut value = DynamicValue::object();
    for (key, v) in pairs {
        value.set_string(&AttributePath::new(key), *v).unwrap();
    }
    value
}
