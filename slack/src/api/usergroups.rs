//! User group API implementation

use serde::{Deserialize, Serialize};

use super::common::FormParams;
use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserGroupPrefs {
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub is_usergroup: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default)]
    pub date_delete: i64,
    #[serde(default)]
    pub auto_type: Option<String>,
    #[serde(default)]
    pub prefs: UserGroupPrefs,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub user_count: u32,
}

impl UserGroup {
    pub fn is_disabled(&self) -> bool {
        self.date_delete > 0
    }

    /// Channel IDs the group is attached to, public and private
    pub fn channel_ids(&self) -> Vec<String> {
        let mut ids = self.prefs.channels.clone();
        for group in &self.prefs.groups {
            if !ids.contains(group) {
                ids.push(group.clone());
            }
        }
        ids
    }
}

/// Arguments for usergroups.create
#[derive(Debug, Clone, Default)]
pub struct CreateUserGroupRequest {
    pub name: String,
    pub handle: Option<String>,
    pub description: Option<String>,
    pub channels: Option<Vec<String>>,
}

/// Arguments for usergroups.update; unset fields are left untouched remotely
#[derive(Debug, Clone, Default)]
pub struct UpdateUserGroupRequest {
    pub usergroup: String,
    pub name: Option<String>,
    pub handle: Option<String>,
    pub description: Option<String>,
    pub channels: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct UserGroupResponse {
    usergroup: UserGroup,
}

#[derive(Debug, Deserialize)]
struct UserGroupsResponse {
    #[serde(default)]
    usergroups: Vec<UserGroup>,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<String>,
}

pub struct UserGroupsApi<'a> {
    client: &'a Client,
}

impl<'a> UserGroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Every group in the workspace, disabled ones included
    pub async fn list(&self) -> Result<Vec<UserGroup>, ApiError> {
        let params = FormParams::new()
            .add("include_disabled", true)
            .add("include_count", true);
        let response: UserGroupsResponse = self.client.call("usergroups.list", &params).await?;
        Ok(response.usergroups)
    }

    pub async fn create(&self, request: &CreateUserGroupRequest) -> Result<UserGroup, ApiError> {
        let mut params = FormParams::new()
            .add("name", &request.name)
            .add_optional("handle", request.handle.as_ref())
            .add_optional("description", request.description.as_ref());
        if let Some(channels) = &request.channels {
            params = params.add_list("channels", channels);
        }

        let response: UserGroupResponse = self.client.call("usergroups.create", &params).await?;
        Ok(response.usergroup)
    }

    pub async fn update(&self, request: &UpdateUserGroupRequest) -> Result<UserGroup, ApiError> {
        let mut params = FormParams::new()
            .add("usergroup", &request.usergroup)
            .add_optional("name", request.name.as_ref())
            .add_optional("handle", request.handle.as_ref())
            .add_optional("description", request.description.as_ref());
        if let Some(channels) = &request.channels {
            params = params.add_list("channels", channels);
        }

        let response: UserGroupResponse = self.client.call("usergroups.update", &params).await?;
        Ok(response.usergroup)
    }

    pub async fn disable(&self, usergroup: &str) -> Result<UserGroup, ApiError> {
        let params = FormParams::new().add("usergroup", usergroup);
        let response: UserGroupResponse = self.client.call("usergroups.disable", &params).await?;
        Ok(response.usergroup)
    }

    pub async fn enable(&self, usergroup: &str) -> Result<UserGroup, ApiError> {
        let params = FormParams::new().add("usergroup", usergroup);
        let response: UserGroupResponse = self.client.call("usergroups.enable", &params).await?;
        Ok(response.usergroup)
    }

    pub async fn users_list(&self, usergroup: &str) -> Result<Vec<String>, ApiError> {
        let params = FormParams::new()
            .add("usergroup", usergroup)
            .add("include_disabled", true);
        let response: UsersResponse = self.client.call("usergroups.users.list", &params).await?;
        Ok(response.users)
    }

    /// Replace the full member list
    pub async fn users_update(&self, usergroup: &str, users: &[String]) -> Result<UserGroup, ApiError> {
        let params = FormParams::new()
            .add("usergroup", usergroup)
            .add_list("users", users);
        let response: UserGroupResponse =
            self.client.call("usergroups.users.update", &params).await?;
        Ok(response.usergroup)
    }
}
