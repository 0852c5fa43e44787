pub mod client;
pub mod common;
pub mod conversations;
pub mod error;
pub mod usergroups;
pub mod users;

pub use client::{Client, RetryConfig, DEFAULT_API_URL};
pub use common::{method_doc_url, FormParams};
pub use conversations::Conversation;
pub use error::{ApiError, SlackErrorCode};
pub use usergroups::{CreateUserGroupRequest, UpdateUserGroupRequest, UserGroup};
pub use users::{AuthIdentity, User};
