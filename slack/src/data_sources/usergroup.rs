//! slack_usergroup data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};

use crate::lookup::find_usergroup;
use crate::provider_data::SlackProviderData;
use crate::resources::usergroup::usergroup_state;

pub const TYPE_NAME: &str = "slack_usergroup";

pub struct UserGroupDataSource {
    data: SlackProviderData,
}

impl UserGroupDataSource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a Slack user group by ID")
            .attribute(AttributeBuilder::string("usergroup_id").required().build())
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(AttributeBuilder::string("handle").computed().build())
            .attribute(AttributeBuilder::string("name").computed().build())
            .attribute(AttributeBuilder::string("description").computed().build())
            .attribute(AttributeBuilder::string("auto_type").computed().build())
            .attribute(AttributeBuilder::string("team_id").computed().build())
            .build()
    }
}

#[async_trait]
impl DataSource for UserGroupDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let usergroup_id = request
            .config
            .get_string(&AttributePath::new("usergroup_id"))
            .unwrap_or_default();

        match find_usergroup(&self.data, &usergroup_id).await {
            Ok(Some(group)) => {
                let mut state = usergroup_state(&group);
                let _ = state.set_string(&AttributePath::new("usergroup_id"), &usergroup_id);
                ReadDataSourceResponse {
                    state,
                    diagnostics: vec![],
                }
            }
            Ok(None) => ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![Diagnostic::error(
                    format!("Slack provider couldn't find a slack usergroup ({})", usergroup_id),
                    format!("a usergroup ({}) is not found in this workspace", usergroup_id),
                )],
            },
            Err(e) => ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![e.into()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::provider_data;
    use mockito::Server;
    use tfplug::types::DynamicValue;

    fn config(usergroup_id: &str) -> DynamicValue {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("usergroup_id"), usergroup_id)
            .unwrap();
        config
    }

    #[tokio::test]
    async fn finds_group_in_cached_list() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("POST", "/usergroups.list")
            .with_body(
                r#"{"ok":true,"usergroups":[{"id":"S1","handle":"ops","name":"Ops","auto_type":"admins"}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let (data, _clock) = provider_data(&server.url(), dir.path());
        let source = UserGroupDataSource::new(data);

        let response = source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    config: config("S1"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.state.get_string(&AttributePath::new("name")).unwrap(), "Ops");
        assert_eq!(
            response.state.get_string(&AttributePath::new("auto_type")).unwrap(),
            "admins"
        );
        list.assert_async().await;
    }

    #[tokio::test]
    async fn missing_group_reloads_once_then_errors() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("POST", "/usergroups.list")
            .with_body(r#"{"ok":true,"usergroups":[]}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let (data, _clock) = provider_data(&server.url(), dir.path());
        let source = UserGroupDataSource::new(data);

        let response = source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    config: config("S9"),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        list.assert_async().await;
    }
}
