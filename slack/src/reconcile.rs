//! Error classification for remote calls.
//!
//! Every remote call is tagged with the `Operation` it performs. Mutating
//! operations may name one Slack error code meaning "already in the desired
//! state"; that code is absorbed, everything else becomes a `ProviderError`
//! carrying the operation, the target and a link to the method's reference.

use thiserror::Error;
use tfplug::Diagnostic;

use crate::api::{method_doc_url, ApiError, SlackErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateConversation,
    ReadConversation,
    ListConversations,
    RenameConversation,
    SetTopic,
    SetPurpose,
    Archive,
    Unarchive,
    Join,
    Invite,
    Leave,
    Kick,
    ListMembers,
    CreateUserGroup,
    UpdateUserGroup,
    ListUserGroups,
    DisableUserGroup,
    EnableUserGroup,
    ListUserGroupMembers,
    UpdateUserGroupMembers,
    ReadUser,
    ListUsers,
}

impl Operation {
    /// Slack Web API method backing this operation
    pub fn method(&self) -> &'static str {
        match self {
            Operation::CreateConversation => "conversations.create",
            Operation::ReadConversation => "conversations.info",
            Operation::ListConversations => "conversations.list",
            Operation::RenameConversation => "conversations.rename",
            Operation::SetTopic => "conversations.setTopic",
            Operation::SetPurpose => "conversations.setPurpose",
            Operation::Archive => "conversations.archive",
            Operation::Unarchive => "conversations.unarchive",
            Operation::Join => "conversations.join",
            Operation::Invite => "conversations.invite",
            Operation::Leave => "conversations.leave",
            Operation::Kick => "conversations.kick",
            Operation::ListMembers => "conversations.members",
            Operation::CreateUserGroup => "usergroups.create",
            Operation::UpdateUserGroup => "usergroups.update",
            Operation::ListUserGroups => "usergroups.list",
            Operation::DisableUserGroup => "usergroups.disable",
            Operation::EnableUserGroup => "usergroups.enable",
            Operation::ListUserGroupMembers => "usergroups.users.list",
            Operation::UpdateUserGroupMembers => "usergroups.users.update",
            Operation::ReadUser => "users.info",
            Operation::ListUsers => "users.list",
        }
    }

    /// What the provider was trying to do, for error summaries
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::CreateConversation => "create conversation",
            Operation::ReadConversation => "read conversation",
            Operation::ListConversations => "list conversations",
            Operation::RenameConversation => "rename conversation",
            Operation::SetTopic => "set topic of conversation",
            Operation::SetPurpose => "set purpose of conversation",
            Operation::Archive => "archive conversation",
            Operation::Unarchive => "unarchive conversation",
            Operation::Join => "join conversation",
            Operation::Invite => "invite user to conversation",
            Operation::Leave => "leave conversation",
            Operation::Kick => "remove user from conversation",
            Operation::ListMembers => "list members of conversation",
            Operation::CreateUserGroup => "create usergroup",
            Operation::UpdateUserGroup => "update usergroup",
            Operation::ListUserGroups => "list usergroups",
            Operation::DisableUserGroup => "disable usergroup",
            Operation::EnableUserGroup => "enable usergroup",
            Operation::ListUserGroupMembers => "list members of usergroup",
            Operation::UpdateUserGroupMembers => "update members of usergroup",
            Operation::ReadUser => "read user",
            Operation::ListUsers => "list users",
        }
    }

    /// The code that means the postcondition already holds
    pub fn tolerated_code(&self) -> Option<SlackErrorCode> {
        match self {
            Operation::Archive => Some(SlackErrorCode::AlreadyArchived),
            Operation::Unarchive => Some(SlackErrorCode::NotArchived),
            Operation::Join | Operation::Invite => Some(SlackErrorCode::AlreadyInChannel),
            Operation::Leave | Operation::Kick => Some(SlackErrorCode::NotInChannel),
            Operation::DisableUserGroup => Some(SlackErrorCode::AlreadyDisabled),
            Operation::EnableUserGroup => Some(SlackErrorCode::AlreadyEnabled),
            Operation::CreateConversation
            | Operation::ReadConversation
            | Operation::ListConversations
            | Operation::RenameConversation
            | Operation::SetTopic
            | Operation::SetPurpose
            | Operation::ListMembers
            | Operation::CreateUserGroup
            | Operation::UpdateUserGroup
            | Operation::ListUserGroups
            | Operation::ListUserGroupMembers
            | Operation::UpdateUserGroupMembers
            | Operation::ReadUser
            | Operation::ListUsers => None,
        }
    }

    pub fn doc_url(&self) -> String {
        method_doc_url(self.method())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Rejected locally, before any remote call
    #[error("{summary}")]
    Configuration { summary: String, detail: String },

    #[error("Slack provider couldn't {} ({target}) due to *{source}*", .operation.describe())]
    Remote {
        operation: Operation,
        target: String,
        #[source]
        source: ApiError,
    },
}

impl ProviderError {
    pub fn remote(operation: Operation, target: impl Into<String>, source: ApiError) -> Self {
        ProviderError::Remote {
            operation,
            target: target.into(),
            source,
        }
    }

    pub fn configuration(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        ProviderError::Configuration {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::Configuration { .. })
    }

    /// The Slack error code behind a remote failure
    pub fn code(&self) -> Option<&SlackErrorCode> {
        match self {
            ProviderError::Remote { source, .. } => source.code(),
            ProviderError::Configuration { .. } => None,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ProviderError::Configuration { detail, .. } => {
                Diagnostic::error(self.to_string(), detail.clone())
            }
            ProviderError::Remote { operation, .. } => Diagnostic::error(
                self.to_string(),
                format!("Please refer to {} for the details.", operation.doc_url()),
            ),
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        err.to_diagnostic()
    }
}

/// Attach operation context to API results
pub trait ApiResultExt<T> {
    /// Any failure is surfaced
    fn during(self, operation: Operation, target: &str) -> Result<T, ProviderError>;

    /// The operation's tolerated code counts as success and yields `None`
    fn tolerating(self, operation: Operation, target: &str) -> Result<Option<T>, ProviderError>;
}

impl<T> ApiResultExt<T> for Result<T, ApiError> {
    fn during(self, operation: Operation, target: &str) -> Result<T, ProviderError> {
        self.map_err(|e| ProviderError::remote(operation, target, e))
    }

    fn tolerating(self, operation: Operation, target: &str) -> Result<Option<T>, ProviderError> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) => match (operation.tolerated_code(), e.code()) {
                (Some(tolerated), Some(code)) if tolerated == *code => {
                    tracing::debug!(
                        operation = operation.method(),
                        target,
                        code = %code,
                        "remote state already matches, ignoring"
                    );
                    Ok(None)
                }
                _ => Err(ProviderError::remote(operation, target, e)),
            },
        }
    }
}

/// Membership and channel sets are keyed by their usergroup's ID, so the
/// declared usergroup can never change under an existing resource.
pub fn ensure_same_usergroup(current_id: &str, declared: &str) -> Result<(), ProviderError> {
    if current_id.is_empty() || current_id == declared {
        return Ok(());
    }

    Err(ProviderError::configuration(
        format!(
            "it's not allowed to change usergroup id (from {} to {})",
            current_id, declared
        ),
        "Please move the state or create another resource instead",
    ))
}
