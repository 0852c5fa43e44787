mod common;

use common::{configured_provider, object};
use mockito::Server;
use tfplug::context::Context;
use tfplug::data_source::ReadDataSourceRequest;
use tfplug::provider::Provider;
use tfplug::types::AttributePath;

#[tokio::test]
async fn user_lookups_by_name_share_the_cache_file() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let provider = configured_provider(&mut server, dir.path()).await;

    let list = server
        .mock("POST", "/users.list")
        .with_body(
            r#"{"ok":true,"members":[
                {"id":"U1","name":"alice","real_name":"Alice Liddell"},
                {"id":"U2","name":"bob","real_name":"Bob","is_bot":true}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    for (name, id) in [("alice", "U1"), ("Bob", "U2")] {
        let source = provider.create_data_source("slack_user").unwrap();
        let response = source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "slack_user".to_string(),
                    config: object(&[("query_type", "name"), ("query_value", name)]),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(response.state.get_string(&AttributePath::new("id")).unwrap(), id);
    }

    assert!(dir.path().join("users.json").exists());
    list.assert_async().await;
}

#[tokio::test]
async fn unknown_data_source_type_is_reported() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let provider = configured_provider(&mut server, dir.path()).await;

    assert!(provider.create_data_source("slack_channel").is_err());
    assert!(provider.create_resource("slack_group").is_err());
}
