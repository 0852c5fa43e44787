//! slack_conversation resource

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

use crate::api::{Conversation, SlackErrorCode};
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation, ProviderError};

pub const TYPE_NAME: &str = "slack_conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOnDestroy {
    None,
    Archive,
}

impl ActionOnDestroy {
    pub const VALUES: [&'static str; 2] = ["none", "archive"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(ActionOnDestroy::None),
            "archive" => Some(ActionOnDestroy::Archive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOnDestroy::None => "none",
            ActionOnDestroy::Archive => "archive",
        }
    }
}

/// Declared fields of a conversation
#[derive(Debug, Clone, PartialEq)]
struct ConversationModel {
    name: String,
    is_private: bool,
    topic: Option<String>,
    purpose: Option<String>,
    is_archived: bool,
    action_on_destroy: ActionOnDestroy,
}

impl ConversationModel {
    fn from_value(value: &DynamicValue) -> Result<Self, Diagnostic> {
        let name = value
            .get_string(&AttributePath::new("name"))
            .map_err(|_| Diagnostic::error("Missing name", "The 'name' attribute is required"))?;
        let action = value
            .get_string(&AttributePath::new("action_on_destroy"))
            .map_err(|_| {
                Diagnostic::error(
                    "Missing action_on_destroy",
                    "The 'action_on_destroy' attribute is required",
                )
            })?;
        let action_on_destroy = parse_action(&action)?;

        Ok(Self {
            name,
            is_private: value
                .get_bool(&AttributePath::new("is_private"))
                .unwrap_or(false),
            topic: non_empty(value.get_string(&AttributePath::new("topic")).ok()),
            purpose: non_empty(value.get_string(&AttributePath::new("purpose")).ok()),
            is_archived: value
                .get_bool(&AttributePath::new("is_archived"))
                .unwrap_or(false),
            action_on_destroy,
        })
    }

    /// Lenient view of stored state; imported state may lack declared fields
    fn from_state(value: &DynamicValue) -> Self {
        Self {
            name: value
                .get_string(&AttributePath::new("name"))
                .unwrap_or_default(),
            is_private: value
                .get_bool(&AttributePath::new("is_private"))
                .unwrap_or(false),
            topic: non_empty(value.get_string(&AttributePath::new("topic")).ok()),
            purpose: non_empty(value.get_string(&AttributePath::new("purpose")).ok()),
            is_archived: value
                .get_bool(&AttributePath::new("is_archived"))
                .unwrap_or(false),
            action_on_destroy: value
                .get_string(&AttributePath::new("action_on_destroy"))
                .ok()
                .and_then(|a| ActionOnDestroy::parse(&a))
                .unwrap_or(ActionOnDestroy::None),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_action(action: &str) -> Result<ActionOnDestroy, Diagnostic> {
    ActionOnDestroy::parse(action).ok_or_else(|| {
        Diagnostic::error(
            format!("{} in action_on_destroy is not acceptable", action),
            format!(
                "Either one of {} and {} is allowed",
                ActionOnDestroy::None.as_str(),
                ActionOnDestroy::Archive.as_str()
            ),
        )
        .with_attribute(AttributePath::new("action_on_destroy"))
    })
}

/// State attributes observable on the remote conversation
pub(crate) fn conversation_state(channel: &Conversation) -> DynamicValue {
    let mut state = DynamicValue::object();
    let _ = state.set_string(&AttributePath::new("id"), &channel.id);
    let _ = state.set_string(&AttributePath::new("name"), &channel.name);
    let _ = state.set_string(&AttributePath::new("topic"), &channel.topic.value);
    let _ = state.set_string(&AttributePath::new("purpose"), &channel.purpose.value);
    let _ = state.set_bool(&AttributePath::new("is_private"), channel.is_private);
    let _ = state.set_bool(&AttributePath::new("is_archived"), channel.is_archived);
    let _ = state.set_bool(&AttributePath::new("is_shared"), channel.is_shared);
    let _ = state.set_bool(&AttributePath::new("is_ext_shared"), channel.is_ext_shared);
    let _ = state.set_bool(&AttributePath::new("is_org_shared"), channel.is_org_shared);
    let _ = state.set_number(&AttributePath::new("created"), channel.created as f64);
    let _ = state.set_string(&AttributePath::new("creator"), &channel.creator);
    state
}

pub struct ConversationResource {
    data: SlackProviderData,
}

impl ConversationResource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Slack conversation (public or private channel)")
            .attribute(
                AttributeBuilder::string("id")
                    .description("Conversation ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .description("Name of the conversation")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::bool("is_private")
                    .description("Create a private channel instead of a public one")
                    .required()
                    .requires_replace()
                    .build(),
            )
            .attribute(AttributeBuilder::string("topic").optional().build())
            .attribute(AttributeBuilder::string("purpose").optional().build())
            .attribute(
                AttributeBuilder::bool("is_archived")
                    .optional()
                    .default(Dynamic::Bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("action_on_destroy")
                    .description("Either of none or archive")
                    .required()
                    .validator(StringOneOf::new(ActionOnDestroy::VALUES))
                    .build(),
            )
            .attribute(AttributeBuilder::bool("is_shared").computed().build())
            .attribute(AttributeBuilder::bool("is_ext_shared").computed().build())
            .attribute(AttributeBuilder::bool("is_org_shared").computed().build())
            .attribute(AttributeBuilder::number("created").computed().build())
            .attribute(AttributeBuilder::string("creator").computed().build())
            .build()
    }

    /// Topic, purpose, then archival, each only when it differs from `prior`
    async fn apply_settings(
        &self,
        id: &str,
        model: &ConversationModel,
        prior: Option<&ConversationModel>,
    ) -> Result<(), ProviderError> {
        let conversations = self.data.client.conversations();

        if let Some(topic) = &model.topic {
            if prior.and_then(|p| p.topic.as_ref()) != Some(topic) {
                tracing::debug!(conversation_id = id, "setting topic");
                conversations
                    .set_topic(id, topic)
                    .await
                    .during(Operation::SetTopic, id)?;
            }
        }

        if let Some(purpose) = &model.purpose {
            if prior.and_then(|p| p.purpose.as_ref()) != Some(purpose) {
                tracing::debug!(conversation_id = id, "setting purpose");
                conversations
                    .set_purpose(id, purpose)
                    .await
                    .during(Operation::SetPurpose, id)?;
            }
        }

        if model.is_archived {
            conversations
                .archive(id)
                .await
                .tolerating(Operation::Archive, id)?;
        } else if prior.is_some() {
            conversations
                .unarchive(id)
                .await
                .tolerating(Operation::Unarchive, id)?;
        }

        Ok(())
    }

    async fn read_back(
        &self,
        id: &str,
        action: ActionOnDestroy,
    ) -> Result<DynamicValue, ProviderError> {
        let channel = self
            .data
            .client
            .conversations()
            .info(id)
            .await
            .during(Operation::ReadConversation, id)?;

        let mut state = conversation_state(&channel);
        let _ = state.set_string(&AttributePath::new("action_on_destroy"), action.as_str());
        Ok(state)
    }
}

#[async_trait]
impl Resource for ConversationResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn create(&self, _ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let planned = self.schema().with_defaults(&request.planned_state);
        let model = match ConversationModel::from_value(&planned) {
            Ok(model) => model,
            Err(diag) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };

        tracing::info!(name = %model.name, is_private = model.is_private, "creating conversation");
        let channel = match self
            .data
            .client
            .conversations()
            .create(&model.name, model.is_private)
            .await
            .during(Operation::CreateConversation, &model.name)
        {
            Ok(channel) => channel,
            Err(e) => {
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![e.into()],
                }
            }
        };

        let mut new_state = conversation_state(&channel);
        let _ = new_state.set_string(
            &AttributePath::new("action_on_destroy"),
            model.action_on_destroy.as_str(),
        );

        // The channel exists from here on; failures keep its ID in state
        if let Err(e) = self.apply_settings(&channel.id, &model, None).await {
            return CreateResourceResponse {
                new_state,
                diagnostics: vec![e.into()],
            };
        }

        if let Some(topic) = &model.topic {
            let _ = new_state.set_string(&AttributePath::new("topic"), topic);
        }
        if let Some(purpose) = &model.purpose {
            let _ = new_state.set_string(&AttributePath::new("purpose"), purpose);
        }
        let _ = new_state.set_bool(&AttributePath::new("is_archived"), model.is_archived);

        CreateResourceResponse {
            new_state,
            diagnostics: vec![],
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

        tracing::debug!(conversation_id = %id, "reading conversation");
        match self.data.client.conversations().info(&id).await {
            Ok(channel) => {
                let mut new_state = conversation_state(&channel);
                if let Ok(action) = request
                    .current_state
                    .get_string(&AttributePath::new("action_on_destroy"))
                {
                    let _ = new_state.set_string(&AttributePath::new("action_on_destroy"), action);
                }
                ReadResourceResponse {
                    new_state: Some(new_state),
                    diagnostics: vec![],
                }
            }
            Err(e) if e.is_code(&SlackErrorCode::ChannelNotFound) => {
                tracing::info!(conversation_id = %id, "conversation is gone, removing from state");
                ReadResourceResponse {
                    new_state: None,
                    diagnostics: vec![],
                }
            }
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![ProviderError::remote(Operation::ReadConversation, id, e).into()],
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
                        "Missing conversation ID",
                        "The prior state carries no conversation ID",
                    )],
                }
            }
        };

        let planned = self.schema().with_defaults(&request.planned_state);
        let model = match ConversationModel::from_value(&planned) {
            Ok(model) => model,
            Err(diag) => {
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics: vec![diag],
                }
            }
        };
        let prior = ConversationModel::from_state(&request.prior_state);

        let result = async {
            if model.name != prior.name {
                tracing::info!(conversation_id = %id, name = %model.name, "renaming conversation");
                self.data
                    .client
                    .conversations()
                    .rename(&id, &model.name)
                    .await
                    .during(Operation::RenameConversation, &id)?;
            }
            self.apply_settings(&id, &model, Some(&prior)).await?;
            self.read_back(&id, model.action_on_destroy).await
        }
        .await;

        match result {
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
        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => return DeleteResourceResponse { diagnostics: vec![] },
        };

        let action = request
            .prior_state
            .get_string(&AttributePath::new("action_on_destroy"))
            .unwrap_or_else(|_| ActionOnDestroy::None.as_str().to_string());

        match parse_action(&action) {
            Ok(ActionOnDestroy::None) => {
                tracing::debug!(conversation_id = %id, "leaving conversation untouched on destroy");
                DeleteResourceResponse { diagnostics: vec![] }
            }
            Ok(ActionOnDestroy::Archive) => {
                tracing::info!(conversation_id = %id, "archiving conversation on destroy");
                match self
                    .data
                    .client
                    .conversations()
                    .archive(&id)
                    .await
                    .tolerating(Operation::Archive, &id)
                {
                    Ok(_) => DeleteResourceResponse { diagnostics: vec![] },
                    Err(e) => DeleteResourceResponse {
                        diagnostics: vec![e.into()],
                    },
                }
            }
            Err(diag) => DeleteResourceResponse {
                diagnostics: vec![diag],
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
