mod common;

use common::{configured_provider, object};
use mockito::{Matcher, Server};
use tfplug::context::Context;
use tfplug::provider::Provider;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest, UpdateResourceRequest,
};
use tfplug::types::{AttributePath, DynamicValue};

const TYPE_NAME: &str = "slack_conversation";

fn channel_body(archived: bool) -> String {
    format!(
        r#"{{"ok":true,"channel":{{"id":"C1","name":"ops","created":1700000000,
            "creator":"UBOT","is_private":false,"is_archived":{}}}}}"#,
        archived
    )
}

fn declared(archived: bool) -> DynamicValue {
    let mut value = object(&[("name", "ops"), ("action_on_destroy", "archive")]);
    value
        .set_bool(&AttributePath::new("is_private"), false)
        .unwrap();
    value
        .set_bool(&AttributePath::new("is_archived"), archived)
        .unwrap();
    value
}

#[tokio::test]
async fn conversation_lifecycle_is_idempotent() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let provider = configured_provider(&mut server, dir.path()).await;
    let resource = provider.create_resource(TYPE_NAME).unwrap();

    // create
    let create = server
        .mock("POST", "/conversations.create")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), "ops".into()),
            Matcher::UrlEncoded("is_private".into(), "false".into()),
        ]))
        .with_body(channel_body(false))
        .expect(1)
        .create_async()
        .await;

    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                planned_state: declared(false),
                config: declared(false),
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(
        created.new_state.get_string(&AttributePath::new("id")).unwrap(),
        "C1"
    );
    create.assert_async().await;

    // read
    let info = server
        .mock("POST", "/conversations.info")
        .match_body(Matcher::UrlEncoded("channel".into(), "C1".into()))
        .with_body(channel_body(false))
        .expect(1)
        .create_async()
        .await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: created.new_state,
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    let state = read.new_state.unwrap();
    assert!(!state.get_bool(&AttributePath::new("is_archived")).unwrap());
    assert_eq!(
        state.get_string(&AttributePath::new("action_on_destroy")).unwrap(),
        "archive"
    );
    info.assert_async().await;
    info.remove_async().await;

    // archive
    let archive = server
        .mock("POST", "/conversations.archive")
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;
    let info = server
        .mock("POST", "/conversations.info")
        .with_body(channel_body(true))
        .create_async()
        .await;

    let archived = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: state,
                planned_state: declared(true),
                config: declared(true),
            },
        )
        .await;
    assert!(archived.diagnostics.is_empty(), "{:?}", archived.diagnostics);
    assert!(archived
        .new_state
        .get_bool(&AttributePath::new("is_archived"))
        .unwrap());
    archive.assert_async().await;
    archive.remove_async().await;

    // Slack now answers already_archived; applying again and destroying both succeed
    let already = server
        .mock("POST", "/conversations.archive")
        .with_body(r#"{"ok":false,"error":"already_archived"}"#)
        .expect(2)
        .create_async()
        .await;
    let rename = server
        .mock("POST", "/conversations.rename")
        .expect(0)
        .create_async()
        .await;

    let reapplied = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: archived.new_state.clone(),
                planned_state: declared(true),
                config: declared(true),
            },
        )
        .await;
    assert!(reapplied.diagnostics.is_empty(), "{:?}", reapplied.diagnostics);

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: reapplied.new_state,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);

    already.assert_async().await;
    rename.assert_async().await;
    info.remove_async().await;
}

#[tokio::test]
async fn vanished_conversation_leaves_state() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let provider = configured_provider(&mut server, dir.path()).await;
    let resource = provider.create_resource(TYPE_NAME).unwrap();

    server
        .mock("POST", "/conversations.info")
        .with_body(r#"{"ok":false,"error":"channel_not_found"}"#)
        .create_async()
        .await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: TYPE_NAME.to_string(),
                current_state: object(&[("id", "C1"), ("name", "ops")]),
            },
        )
        .await;

    assert!(read.diagnostics.is_empty());
    assert!(read.new_state.is_none());
}

#[tokio::test]
async fn failed_rename_reports_method_and_docs() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let provider = configured_provider(&mut server, dir.path()).await;
    let resource = provider.create_resource(TYPE_NAME).unwrap();

    server
        .mock("POST", "/conversations.rename")
        .with_body(r#"{"ok":false,"error":"name_taken"}"#)
        .create_async()
        .await;

    let mut prior = declared(false);
    prior.set_string(&AttributePath::new("id"), "C1").unwrap();
    prior.set_string(&AttributePath::new("name"), "old").unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: TYPE_NAME.to_string(),
                prior_state: prior,
                planned_state: declared(false),
                config: declared(false),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    let diag = &response.diagnostics[0];
    assert!(diag.summary.contains("rename conversation"));
    assert!(diag.summary.contains("name_taken"));
    assert!(diag
        .detail
        .contains("https://api.slack.com/methods/conversations.rename"));
}
