//! slack_usergroup_channels resource
//!
//! Default channels of a user group, stored under the group's own ID.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::import_state_passthrough_id;

use super::declared_usergroup;
use crate::api::{UpdateUserGroupRequest, UserGroup};
use crate::lookup::find_usergroup;
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation, ProviderError};

pub const TYPE_NAME: &str = "slack_usergroup_channels";

fn channels_state(group: &UserGroup) -> DynamicValue {
    let mut state = DynamicValue::object();
    let _ = state.set_string(&AttributePath::new("id"), &group.id);
    let _ = state.set_string(&AttributePath::new("usergroup_id"), &group.id);
    let _ = state.set_string_list(&AttributePath::new("channels"), group.channel_ids());
    state
}

pub struct UserGroupChannelsResource {
    data: SlackProviderData,
}

impl UserGroupChannelsResource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages the default channels of a Slack user group")
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(
                AttributeBuilder::string("usergroup_id")
                    .description("ID of the user group; cannot change once created")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_set("channels")
                    .description("Channel IDs members of the group are added to")
                    .required()
                    .build(),
            )
            .build()
    }

    async fn set_channels(
        &self,
        usergroup_id: &str,
        channels: Vec<String>,
    ) -> Result<UserGroup, ProviderError> {
        tracing::info!(usergroup_id, count = channels.len(), "setting usergroup channels");
        self.data
            .client
            .usergroups()
            .update(&UpdateUserGroupRequest {
                usergroup: usergroup_id.to_string(),
                name: None,
                handle: None,
                description: None,
                channels: Some(channels),
            })
            .await
            .during(Operation::UpdateUserGroup, usergroup_id)
    }

    async fn apply(&self, stored: &DynamicValue, planned: &DynamicValue) -> Result<DynamicValue, ProviderError> {
        let usergroup_id = declared_usergroup(stored, planned)?;
        let channels = planned
            .get_string_list(&AttributePath::new("channels"))
            .unwrap_or_default();
        let group = self.set_channels(&usergroup_id, channels).await?;
        Ok(channels_state(&group))
    }
}

#[async_trait]
impl Resource for UserGroupChannelsResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = self.schema().validate(&request.config);
        if !request.prior_state.is_null() {
            if let Err(e) = declared_usergroup(&request.prior_state, &request.config) {
                diagnostics.push(e.into());
            }
        }
        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.apply(&DynamicValue::null(), &request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let usergroup_id = match declared_usergroup(&request.current_state, &request.current_state) {
            Ok(id) => id,
            Err(e) => {
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics: vec![e.into()],
                }
            }
        };

        match find_usergroup(&self.data, &usergroup_id).await {
            Ok(Some(group)) => ReadResourceResponse {
                new_state: Some(channels_state(&group)),
                diagnostics: vec![],
            },
            Ok(None) => {
                tracing::warn!(usergroup_id = %usergroup_id, "usergroup gone, dropping channels from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self.apply(&request.prior_state, &request.planned_state).await {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let result = match declared_usergroup(&request.prior_state, &request.prior_state) {
            Ok(usergroup_id) => self.set_channels(&usergroup_id, vec![]).await.map(|_| ()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => DeleteResourceResponse { diagnostics: vec![] },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        import_state_passthrough_id(
            &[AttributePath::new("id"), AttributePath::new("usergroup_id")],
            &request,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::provider_data;
    use mockito::{Matcher, Server};

    fn stored(usergroup_id: &str) -> DynamicValue {
        let mut value = DynamicValue::object();
        value.set_string(&AttributePath::new("id"), usergroup_id).unwrap();
        value
            .set_string(&AttributePath::new("usergroup_id"), usergroup_id)
            .unwrap();
        value
            .set_string_list(&AttributePath::new("channels"), ["C1"])
            .unwrap();
        value
    }

    fn planned(usergroup_id: &str, channels: &[&str]) -> DynamicValue {
        let mut value = DynamicValue::object();
        value
            .set_string(&AttributePath::new("usergroup_id"), usergroup_id)
            .unwrap();
        value
            .set_string_list(&AttributePath::new("channels"), channels.iter().copied())
            .unwrap();
        value
    }

    #[tokio::test]
    async fn create_sends_channel_list() {
        let mut server = Server::new_async().await;
        let update = server
            .mock("POST", "/usergroups.update")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("usergroup".into(), "S1".into()),
                Matcher::UrlEncoded("channels".into(), "C1,C2".into()),
            ]))
            .with_body(r#"{"ok":true,"usergroup":{"id":"S1","prefs":{"channels":["C1","C2"],"groups":[]}}}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let (data, _clock) = provider_data(&server.url(), dir.path());
        let resource = UserGroupChannelsResource::new(data);

        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    planned_state: planned("S1", &["C1", "C2"]),
                    config: planned("S1", &["C1", "C2"]),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response.new_state.get_string(&AttributePath::new("id")).unwrap(),
            "S1"
        );
        assert_eq!(
            response
                .new_state
                .get_string_list(&AttributePath::new("channels"))
                .unwrap(),
            vec!["C1", "C2"]
        );
        update.assert_async().await;
    }

    #[tokio::test]
    async fn delete_clears_channels() {
        let mut server = Server::new_async().await;
        let update = server
            .mock("POST", "/usergroups.update")
            .match_body(Matcher::UrlEncoded("channels".into(), "".into()))
            .with_body(r#"{"ok":true,"usergroup":{"id":"S1"}}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let (data, _clock) = provider_data(&server.url(), dir.path());
        let resource = UserGroupChannelsResource::new(data);

        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    prior_state: stored("S1"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        update.assert_async().await;
    }

    #[tokio::test]
    async fn update_with_changed_usergroup_makes_no_call() {
        let mut server = Server::new_async().await;
        let any = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let (data, _clock) = provider_data(&server.url(), dir.path());
        let resource = UserGroupChannelsResource::new(data);

        let response = resource
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    prior_state: stored("S1"),
                    planned_state: planned("S2", &["C1"]),
                    config: planned("S2", &["C1"]),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].summary.contains("from S1 to S2"));
        any.assert_async().await;
    }

    #[tokio::test]
    async fn read_drops_state_when_group_is_gone() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("POST", "/usergroups.list")
            .with_body(r#"{"ok":true,"usergroups":[]}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let (data, _clock) = provider_data(&server.url(), dir.path());
        let resource = UserGroupChannelsResource::new(data);

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: TYPE_NAME.to_string(),
                    current_state: stored("S1"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.new_state.is_none());
        list.assert_async().await;
    }
}
