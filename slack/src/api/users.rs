//! User and auth API implementation

use serde::{Deserialize, Serialize};

use super::common::{FormParams, ResponseMetadata};
use super::{ApiError, Client};

const PAGE_LIMIT: u32 = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub has_2fa: bool,
    #[serde(default)]
    pub profile: UserProfile,
}

impl User {
    /// Whether `name` matches any of the names Slack shows for this user
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.real_name == name || self.profile.display_name == name
    }
}

/// Identity behind the configured token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthIdentity {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub team_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Debug, Deserialize)]
struct UsersPage {
    #[serde(default)]
    members: Vec<User>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn auth_test(&self) -> Result<AuthIdentity, ApiError> {
        self.client.call("auth.test", &FormParams::new()).await
    }

    pub async fn info(&self, user: &str) -> Result<User, ApiError> {
        let params = FormParams::new().add("user", user);
        let response: UserResponse = self.client.call("users.info", &params).await?;
        Ok(response.user)
    }

    /// Every user in the workspace, following cursors until exhausted
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        let mut users = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = FormParams::new()
                .add("limit", PAGE_LIMIT)
                .add_optional("cursor", cursor.as_deref());
            let page: UsersPage = self.client.call("users.list", &params).await?;
            users.extend(page.members);

            match page.response_metadata.cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        Ok(users)
    }
}
