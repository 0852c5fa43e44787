//! Lookups served from the list cache.
//!
//! A snapshot can be up to one TTL old, so an ID created moments ago may be
//! missing from it. A miss triggers a live reload before the entity is
//! reported absent, at most once per list per TTL window, so a run full of
//! absent IDs costs one extra list call rather than one per lookup.

use crate::api::{User, UserGroup};
use crate::cache::{USERGROUPS_KEY, USERS_KEY};
use crate::provider_data::SlackProviderData;
use crate::reconcile::{ApiResultExt, Operation, ProviderError};

pub async fn find_usergroup(
    data: &SlackProviderData,
    id: &str,
) -> Result<Option<UserGroup>, ProviderError> {
    let groups: Vec<UserGroup> = data
        .cache
        .fetch_or_load(USERGROUPS_KEY, move || async move {
            data.client.usergroups().list().await
        })
        .await
        .during(Operation::ListUserGroups, id)?;

    if let Some(group) = groups.into_iter().find(|g| g.id == id) {
        return Ok(Some(group));
    }

    tracing::debug!(usergroup_id = id, "usergroup not in cached list, reloading");
    let groups: Option<Vec<UserGroup>> = data
        .cache
        .reload_on_miss(USERGROUPS_KEY, move || async move {
            data.client.usergroups().list().await
        })
        .await
        .during(Operation::ListUserGroups, id)?;

    Ok(groups.and_then(|groups| groups.into_iter().find(|g| g.id == id)))
}

/// Match on login name, real name or display name
pub async fn find_user_by_name(
    data: &SlackProviderData,
    name: &str,
) -> Result<Option<User>, ProviderError> {
    let users: Vec<User> = data
        .cache
        .fetch_or_load(USERS_KEY, move || async move { data.client.users().list().await })
        .await
        .during(Operation::ListUsers, name)?;

    if let Some(user) = users.into_iter().find(|u| u.answers_to(name)) {
        return Ok(Some(user));
    }

    tracing::debug!(name, "user not in cached list, reloading");
    let users: Option<Vec<User>> = data
        .cache
        .reload_on_miss(USERS_KEY, move || async move { data.client.users().list().await })
        .await
        .during(Operation::ListUsers, name)?;

    Ok(users.and_then(|users| users.into_iter().find(|u| u.answers_to(name))))
}
