//! slack_usergroup_members resource
//!
//! The member list of a user group, stored under the group's own ID.

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
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation, ProviderError};

pub const TYPE_NAME: &str = "slack_usergroup_members";

fn members_state(usergroup_id: &str, members: &[String]) -> DynamicValue {
    let mut state = DynamicValue::object();
    let _ = state.set_string(&AttributePath::new("id"), usergroup_id);
    let _ = state.set_string(&AttributePath::new("usergroup_id"), usergroup_id);
    let _ = state.set_string_list(&AttributePath::new("members"), members.iter().cloned());
    state
}

fn declared_members(value: &DynamicValue) -> Vec<String> {
    value
        .get_string_list(&AttributePath::new("members"))
        .unwrap_or_default()
}

pub struct UserGroupMembersResource {
    data: SlackProviderData,
}

impl UserGroupMembersResource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages the members of a Slack user group")
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(
                AttributeBuilder::string("usergroup_id")
                    .description("ID of the user group; cannot change once created")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_set("members")
                    .description("User IDs of the members")
                    .required()
                    .build(),
            )
            .build()
    }

    async fn replace_members(
        &self,
        usergroup_id: &str,
        members: &[String],
    ) -> Result<DynamicValue, ProviderError> {
        tracing::debug!(usergroup_id, count = members.len(), "replacing usergroup members");
        let group = self
            .data
            .client
            .usergroups()
            .users_update(usergroup_id, members)
            .await
            .during(Operation::UpdateUserGroupMembers, usergroup_id)?;

        // The response only lists users when Slack chooses to include them
        if group.users.is_empty() {
            Ok(members_state(usergroup_id, members))
        } else {
            Ok(members_state(usergroup_id, &group.users))
        }
    }

    async fn update_members(&self, request: &UpdateResourceRequest) -> Result<DynamicValue, ProviderError> {
        let usergroup_id = declared_usergroup(&request.prior_state, &request.planned_state)?;

        // A disabled group rejects member updates
        self.data
            .client
            .usergroups()
            .enable(&usergroup_id)
            .await
            .tolerating(Operation::EnableUserGroup, &usergroup_id)?;

        self.replace_members(&usergroup_id, &declared_members(&request.planned_state))
            .await
    }

    /// usergroups.users.update rejects an empty list, so removal disables the group
    async fn remove_members(&self, prior_state: &DynamicValue) -> Result<(), ProviderError> {
        let usergroup_id = declared_usergroup(prior_state, prior_state)?;

        self.data
            .client
            .usergroups()
            .disable(&usergroup_id)
            .await
            .tolerating(Operation::DisableUserGroup, &usergroup_id)?;
        Ok(())
    }
}

#[async_trait]
impl Resource for UserGroupMembersResource {
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
        let result = match declared_usergroup(&DynamicValue::null(), &request.planned_state) {
            Ok(usergroup_id) => {
                tracing::info!(usergroup_id = %usergroup_id, "attaching usergroup members");
                self.replace_members(&usergroup_id, &declared_members(&request.planned_state))
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
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

        tracing::debug!(usergroup_id = %usergroup_id, "reading usergroup members");
        match self
            .data
            .client
            .usergroups()
            .users_list(&usergroup_id)
            .await
            .during(Operation::ListUserGroupMembers, &usergroup_id)
        {
            Ok(members) => ReadResourceResponse {
                new_state: Some(members_state(&usergroup_id, &members)),
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self.update_members(&request).await {
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
        match self.remove_members(&request.prior_state).await {
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
