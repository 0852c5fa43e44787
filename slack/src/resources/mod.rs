//! Resource implementations

pub mod conversation;
pub mod conversation_member;
pub mod usergroup;
pub mod usergroup_channels;
pub mod usergroup_members;

pub use conversation::ConversationResource;
pub use conversation_member::ConversationMemberResource;
pub use usergroup::UserGroupResource;
pub use usergroup_channels::UserGroupChannelsResource;
pub use usergroup_members::UserGroupMembersResource;

use tfplug::types::{AttributePath, DynamicValue};

use crate::reconcile::{ensure_same_usergroup, ProviderError};

/// Resolve the declared `usergroup_id` of a usergroup sub-resource, refusing
/// any value that differs from the ID the resource was stored under.
pub(crate) fn declared_usergroup(
    stored: &DynamicValue,
    declared: &DynamicValue,
) -> Result<String, ProviderError> {
    let usergroup_id = declared
        .get_string(&AttributePath::new("usergroup_id"))
        .map_err(|_| {
            ProviderError::configuration(
                "Missing usergroup_id",
                "The 'usergroup_id' attribute is required",
            )
        })?;

    let current_id = stored
        .get_string(&AttributePath::new("id"))
        .unwrap_or_default();
    ensure_same_usergroup(&current_id, &usergroup_id)?;

    Ok(usergroup_id)
}
