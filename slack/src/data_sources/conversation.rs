//! slack_conversation data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    DataSource, ReadDataSourceRequest, ReadDataSourceResponse, ValidateDataSourceConfigRequest,
    ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::api::{Conversation, SlackErrorCode};
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation, ProviderError};
use crate::resources::conversation::conversation_state;

pub const TYPE_NAME: &str = "slack_conversation";

enum Query {
    Id(String),
    Name(String),
}

impl Query {
    fn from_config(config: &DynamicValue) -> Result<Self, Diagnostic> {
        let id = config
            .get_string(&AttributePath::new("channel_id"))
            .ok()
            .filter(|v| !v.is_empty());
        let name = config
            .get_string(&AttributePath::new("channel_name"))
            .ok()
            .filter(|v| !v.is_empty());

        match (id, name) {
            (Some(id), None) => Ok(Query::Id(id)),
            (None, Some(name)) => Ok(Query::Name(name)),
            _ => Err(Diagnostic::error(
                "Invalid conversation query",
                "Exactly one of channel_id and channel_name must be set",
            )),
        }
    }

    fn target(&self) -> &str {
        match self {
            Query::Id(v) | Query::Name(v) => v,
        }
    }
}

pub struct ConversationDataSource {
    data: SlackProviderData,
}

impl ConversationDataSource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a Slack conversation by ID or name")
            .attribute(AttributeBuilder::string("channel_id").optional().build())
            .attribute(AttributeBuilder::string("channel_name").optional().build())
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(AttributeBuilder::string("name").computed().build())
            .attribute(AttributeBuilder::string("topic").computed().build())
            .attribute(AttributeBuilder::string("purpose").computed().build())
            .attribute(AttributeBuilder::bool("is_private").computed().build())
            .attribute(AttributeBuilder::bool("is_archived").computed().build())
            .attribute(AttributeBuilder::bool("is_shared").computed().build())
            .attribute(AttributeBuilder::bool("is_ext_shared").computed().build())
            .attribute(AttributeBuilder::bool("is_org_shared").computed().build())
            .attribute(AttributeBuilder::number("created").computed().build())
            .attribute(AttributeBuilder::string("creator").computed().build())
            .build()
    }

    async fn lookup(&self, query: &Query) -> Result<Option<Conversation>, ProviderError> {
        let conversations = self.data.client.conversations();
        match query {
            Query::Id(id) => match conversations.info(id).await.during(Operation::ReadConversation, id) {
                Ok(channel) => Ok(Some(channel)),
                Err(e) if e.code() == Some(&SlackErrorCode::ChannelNotFound) => Ok(None),
                Err(e) => Err(e),
            },
            Query::Name(name) => {
                let channels = conversations
                    .list(false)
                    .await
                    .during(Operation::ListConversations, name)?;
                Ok(channels.into_iter().find(|c| &c.name == name))
            }
        }
    }
}

#[async_trait]
impl DataSource for ConversationDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let mut diagnostics = self.schema().validate(&request.config);
        if let Err(diag) = Query::from_config(&request.config) {
            diagnostics.push(diag);
        }
        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let query = match Query::from_config(&request.config) {
            Ok(query) => query,
            Err(diag) => {
                return ReadDataSourceResponse {
                    state: request.config,
                    diagnostics: vec![diag],
                }
            }
        };

        match self.lookup(&query).await {
            Ok(Some(channel)) => {
                let mut state = conversation_state(&channel);
                match &query {
                    Query::Id(id) => {
                        let _ = state.set_string(&AttributePath::new("channel_id"), id);
                    }
                    Query::Name(name) => {
                        let _ = state.set_string(&AttributePath::new("channel_name"), name);
                    }
                }
                ReadDataSourceResponse {
                    state,
                    diagnostics: vec![],
                }
            }
            Ok(None) => ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![Diagnostic::error(
                    format!("Slack provider couldn't find a slack conversation ({})", query.target()),
                    "the conversation does not exist or is not visible to this token",
                )],
            },
            Err(e) => ReadDataSourceResponse {
                state: request.config,
                diagnostics: vec![e.into()],
            },
        }
    }
}
