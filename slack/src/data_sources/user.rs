//! slack_user data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{DataSource, ReadDataSourceRequest, ReadDataSourceResponse};
use tfplug::schema::{AttributeBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::StringOneOf;

use crate::api::{SlackErrorCode, User};
use crate::lookup::find_user_by_name;
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation, ProviderError};

pub const TYPE_NAME: &str = "slack_user";

pub const QUERY_TYPES: [&str; 2] = ["id", "name"];

fn user_state(config: &DynamicValue, user: &User) -> DynamicValue {
    let mut state = config.clone();
    let _ = state.set_string(&AttributePath::new("id"), &user.id);
    let _ = state.set_string(&AttributePath::new("name"), &user.name);
    let _ = state.set_string(&AttributePath::new("real_name"), &user.real_name);
    let _ = state.set_bool(&AttributePath::new("is_admin"), user.is_admin);
    let _ = state.set_bool(&AttributePath::new("is_owner"), user.is_owner);
    let _ = state.set_bool(&AttributePath::new("is_bot"), user.is_bot);
    let _ = state.set_bool(&AttributePath::new("has_2fa"), user.has_2fa);
    state
}

pub struct UserDataSource {
    data: SlackProviderData,
}

impl UserDataSource {
    pub fn new(data: SlackProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Looks up a Slack user by ID or name")
            .attribute(
                AttributeBuilder::string("query_type")
                    .description("Either id or name")
                    .required()
                    .validator(StringOneOf::new(QUERY_TYPES))
                    .build(),
            )
            .attribute(AttributeBuilder::string("query_value").required().build())
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(AttributeBuilder::string("name").computed().build())
            .attribute(AttributeBuilder::string("real_name").computed().build())
            .attribute(AttributeBuilder::bool("is_admin").computed().build())
            .attribute(AttributeBuilder::bool("is_owner").computed().build())
            .attribute(AttributeBuilder::bool("is_bot").computed().build())
            .attribute(AttributeBuilder::bool("has_2fa").computed().build())
            .build()
    }

    async fn lookup(&self, query_type: &str, query_value: &str) -> Result<Option<User>, ProviderError> {
        match query_type {
            "id" => match self
                .data
                .client
                .users()
                .info(query_value)
                .await
                .during(Operation::ReadUser, query_value)
            {
                Ok(user) => Ok(Some(user)),
                Err(e) if e.code() == Some(&SlackErrorCode::UserNotFound) => Ok(None),
                Err(e) => Err(e),
            },
            "name" => find_user_by_name(&self.data, query_value).await,
            other => Err(ProviderError::configuration(
                format!("{} is an invalid value for argument query_type", other),
                format!("Either one of {} is allowed", QUERY_TYPES.join(", ")),
            )),
        }
    }
}

#[async_trait]
impl DataSource for UserDataSource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Self::schema_static()
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let config = request.config;
        let query_type = config
            .get_string(&AttributePath::new("query_type"))
            .unwrap_or_default();
        let query_value = config
            .get_string(&AttributePath::new("query_value"))
            .unwrap_or_default();

        tracing::debug!(query_type = %query_type, query_value = %query_value, "looking up user");
        match self.lookup(&query_type, &query_value).await {
            Ok(Some(user)) => ReadDataSourceResponse {
                state: user_state(&config, &user),
                diagnostics: vec![],
            },
            Ok(None) => ReadDataSourceResponse {
                state: config,
                diagnostics: vec![Diagnostic::error(
                    format!("Slack provider couldn't find a slack user ({})", query_value),
                    format!("no user matches {} {}", query_type, query_value),
                )],
            },
            Err(e) => ReadDataSourceResponse {
                state: config,
                diagnostics: vec![e.into()],
            },
        }
    }
}
