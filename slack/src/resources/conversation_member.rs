//! slack_conversation_member resource
//!
//! One user's membership in one conversation. Membership calls race the
//! creation of the conversation or user they refer to, so they run under the
//! session's retry policy.

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, Resource, UpdateResourceRequest,
    UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::SlackErrorCode;
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation, ProviderError};
use crate::retry::retry;

pub const TYPE_NAME: &str = "slack_conversation_member";

#[derive(Debug, Clone, PartialEq)]
struct MemberModel {
    conversation_id: String,
    user_id: String,
    keep_after_destroy: bool,
}

impl MemberModel {
    fn from_value(value: &DynamicValue) -> Result<Self, Diagnostic> {
        let conversation_id = value
            .get_string(&AttributePath::new("conversation_id"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing conversation_id",
                    "The 'conversation_id' attribute is required",
                )
            })?;
        let user_id = value
            .get_string(&AttributePath::new("user_id"))
            .map_err(|_| Diagnostic::error("Missing user_id", "The 'user_id' attribute is required"))?;

        Ok(Self {
            conversation_id,
            user_id,
            keep_after_destroy: value
                .get_bool(&AttributePath::new("keep_after_destroy"))
                .unwrap_or(false),
        })
    }

    fn id(&self) -> String {
        format!("{}-{}", self.conversation_id, self.user_id)
    }

    fn to_state(&self) -> DynamicValue {
        let mut state = DynamicValue::object();
        let _ = state.set_string(&AttributePath::new("id"), self.id());
        let _ = state.set_string(&AttributePath::new("conversation_id"), &self.conversation_id);
        let _ = state.set_string(&AttributePath::new("user_id"), &self.user_id);
        let _ = state.set_bool(
            &AttributePath::new("keep_after_destroy"),
            self.keep_after_destroy,
        );
        state
    }
}

pub struct ConversationMemberResource {
    data: SlackProviderData,
}

impl ConversationMemberResource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages the membership of a user in a Slack conversation")
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(
                AttributeBuilder::string("conversation_id")
                    .required()
                    .requires_replace()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("user_id")
                    .required()
                    .requires_replace()
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("keep_after_destroy")
                    .description("Leave membership in channel intact, even if this resource is destroyed")
                    .optional()
                    .requires_replace()
                    .default(Dynamic::Bool(false))
                    .build(),
            )
            .build()
    }

    /// Join when the member is the token's own user, invite otherwise
    async fn add_member(&self, ctx: &Context, model: &MemberModel) -> Result<(), ProviderError> {
        let conversation = model.conversation_id.as_str();
        let user = model.user_id.as_str();

        retry(ctx, self.data.retry, move || async move {
            let conversations = self.data.client.conversations();
            if self.data.is_self(user) {
                tracing::debug!(conversation_id = conversation, user_id = user, "joining conversation");
                conversations
                    .join(conversation)
                    .await
                    .tolerating(Operation::Join, conversation)
            } else {
                tracing::debug!(conversation_id = conversation, user_id = user, "inviting member");
                conversations
                    .invite(conversation, &[user.to_string()])
                    .await
                    .tolerating(Operation::Invite, conversation)
            }
        })
        .await
        .map(|_| ())
    }

    /// Leave when the member is the token's own user, kick otherwise
    async fn remove_member(&self, ctx: &Context, model: &MemberModel) -> Result<(), ProviderError> {
        let conversation = model.conversation_id.as_str();
        let user = model.user_id.as_str();

        retry(ctx, self.data.retry, move || async move {
            let conversations = self.data.client.conversations();
            if self.data.is_self(user) {
                tracing::debug!(conversation_id = conversation, user_id = user, "leaving conversation");
                conversations
                    .leave(conversation)
                    .await
                    .tolerating(Operation::Leave, conversation)
            } else {
                tracing::debug!(conversation_id = conversation, user_id = user, "removing member");
                conversations
                    .kick(conversation, user)
                    .await
                    .tolerating(Operation::Kick, conversation)
            }
        })
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl Resource for ConversationMemberResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let planned = self.schema().with_defaults(&request.planned_state);
        let model = match MemberModel::from_value(&planned) {
            Ok(model) => model,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };

        match self.add_member(&ctx, &model).await {
            Ok(()) => CreateResourceResponse {
                new_state: model.to_state(),
                diagnostics: vec![],
            },
            Err(e) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![e.into()],
            },
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let model = match MemberModel::from_value(&request.current_state) {
            Ok(model) => model,
            Err(_) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
        };

        let members = self
            .data
            .client
            .conversations()
            .members(&model.conversation_id)
            .await;

        match members {
            Ok(members) if members.contains(&model.user_id) => ReadResourceResponse {
                new_state: Some(model.to_state()),
                diagnostics: vec![],
            },
            Ok(_) => {
                tracing::info!(id = %model.id(), "membership is gone, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_code(&SlackErrorCode::ChannelNotFound) => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![ProviderError::remote(
                    Operation::ListMembers,
                    &model.conversation_id,
                    e,
                )
                .into()],
            },
        }
    }

    /// Every attribute forces replacement, so there is nothing to apply
    async fn update(&self, _ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            diagnostics: vec![],
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let model = match MemberModel::from_value(&request.prior_state) {
            Ok(model) => model,
            Err(_) => return DeleteResourceResponse { diagnostics: vec![] },
        };

        if model.keep_after_destroy {
            tracing::debug!(id = %model.id(), "keeping membership after destroy");
            return DeleteResourceResponse { diagnostics: vec![] };
        }

        match self.remove_member(&ctx, &model).await {
            Ok(()) => DeleteResourceResponse { diagnostics: vec![] },
            Err(e) => DeleteResourceResponse {
                diagnostics: vec![e.into()],
            },
        }
    }
}
