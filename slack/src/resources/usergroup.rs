//! slack_usergroup resource

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::StringOneOf;
use tfplug::import_state_passthrough_id;

use crate::api::{CreateUserGroupRequest, UpdateUserGroupRequest, UserGroup};
use crate::lookup::find_usergroup;
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation};

pub const TYPE_NAME: &str = "slack_usergroup";

pub const AUTO_TYPES: [&str; 3] = ["admins", "owners", ""];

#[derive(Debug, Clone, PartialEq)]
struct UserGroupModel {
    handle: String,
    name: String,
    description: String,
    auto_type: String,
}

impl UserGroupModel {
    fn from_value(value: &DynamicValue) -> Result<Self, Diagnostic> {
        let handle = value
            .get_string(&AttributePath::new("handle"))
            .map_err(|_| Diagnostic::error("Missing handle", "The 'handle' attribute is required"))?;

        // An unset or empty name falls back to the handle
        let name = value
            .get_string(&AttributePath::new("name"))
            .ok()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| handle.clone());

        Ok(Self {
            handle,
            name,
            description: value
                .get_string(&AttributePath::new("description"))
                .unwrap_or_default(),
            auto_type: value
                .get_string(&AttributePath::new("auto_type"))
                .unwrap_or_default(),
        })
    }
}

pub(crate) fn usergroup_state(group: &UserGroup) -> DynamicValue {
    let mut state = DynamicValue::object();
    let _ = state.set_string(&AttributePath::new("id"), &group.id);
    let _ = state.set_string(&AttributePath::new("handle"), &group.handle);
    let _ = state.set_string(&AttributePath::new("name"), &group.name);
    let _ = state.set_string(&AttributePath::new("description"), &group.description);
    let _ = state.set_string(
        &AttributePath::new("auto_type"),
        group.auto_type.clone().unwrap_or_default(),
    );
    let _ = state.set_string(&AttributePath::new("team_id"), &group.team_id);
    state
}

pub struct UserGroupResource {
    data: SlackProviderData,
}

impl UserGroupResource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Slack user group")
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(
                AttributeBuilder::string("handle")
                    .description("Mention handle, without the leading @")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .description("Display name, defaults to the handle")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(AttributeBuilder::string("description").optional().build())
            .attribute(
                AttributeBuilder::string("auto_type")
                    .optional()
                    .default(Dynamic::String(String::new()))
                    .validator(StringOneOf::new(AUTO_TYPES))
                    .build(),
            )
            .attribute(AttributeBuilder::string("team_id").computed().build())
            .build()
    }
}

#[async_trait]
impl Resource for UserGroupResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let model = match UserGroupModel::from_value(&request.planned_state) {
            Ok(model) => model,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };

        tracing::info!(handle = %model.handle, name = %model.name, "creating usergroup");
        let result = self
            .data
            .client
            .usergroups()
            .create(&CreateUserGroupRequest {
                name: model.name.clone(),
                handle: Some(model.handle.clone()),
                description: Some(model.description.clone()).filter(|d| !d.is_empty()),
                channels: None,
            })
            .await
            .during(Operation::CreateUserGroup, &model.handle);

        match result {
            Ok(group) => CreateResourceResponse {
                new_state: usergroup_state(&group),
                diagnostics: vec![],
            },
            Err(e) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let id = match request.current_state.get_string(&AttributePath::new("id")) {
            Ok(id) if !id.is_empty() => id,
            _ => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
        };

        tracing::debug!(usergroup_id = %id, "reading usergroup");
        match find_usergroup(&self.data, &id).await {
            Ok(Some(group)) => ReadResourceResponse {
                new_state: Some(usergroup_state(&group)),
                diagnostics: vec![],
            },
            Ok(None) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![Diagnostic::error(
                    format!("Slack provider couldn't find a slack usergroup ({})", id),
                    format!("a usergroup ({}) is not found in this workspace", id),
                )],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => {
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![Diagnostic::error(
                        "Missing usergroup ID",
                        "The prior state carries no usergroup ID",
                    )],
                }
            }
        };
        let model = match UserGroupModel::from_value(&request.planned_state) {
            Ok(model) => model,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };

        tracing::info!(usergroup_id = %id, "updating usergroup");
        let result = self
            .data
            .client
            .usergroups()
            .update(&UpdateUserGroupRequest {
                usergroup: id.clone(),
                name: Some(model.name),
                handle: Some(model.handle),
                description: Some(model.description),
                channels: None,
            })
            .await
            .during(Operation::UpdateUserGroup, &id);

        match result {
            Ok(group) => UpdateResourceResponse {
                new_state: usergroup_state(&group),
                diagnostics: vec![],
            },
            Err(e) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![e.into()],
            },
        }
    }

    /// Slack has no delete for user groups; disabling is the closest end state
    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => return DeleteResourceResponse { diagnostics: vec![] },
        };

        tracing::info!(usergroup_id = %id, "disabling usergroup");
        match self
            .data
            .client
            .usergroups()
            .disable(&id)
            .await
            .tolerating(Operation::DisableUserGroup, &id)
        {
            Ok(_) => DeleteResourceResponse { diagnostics: vec![] },
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
        import_state_passthrough_id(&[AttributePath::new("id")], &request)
    }
}
