//! Data source implementations

pub mod conversation;
pub mod user;
pub mod usergroup;

pub use conversation::ConversationDataSource;
pub use user::UserDataSource;
pub use usergroup::UserGroupDataSource;
