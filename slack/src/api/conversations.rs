//! Conversation (public and private channel) API implementation

use serde::{Deserialize, Serialize};

use super::common::{Ack, FormParams, ResponseMetadata};
use super::{ApiError, Client};

const PAGE_LIMIT: u32 = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub last_set: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub topic: TextValue,
    #[serde(default)]
    pub purpose: TextValue,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub is_ext_shared: bool,
    #[serde(default)]
    pub is_org_shared: bool,
    #[serde(default)]
    pub is_general: bool,
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    channel: Conversation,
}

#[derive(Debug, Deserialize)]
struct MembersPage {
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct ChannelsPage {
    #[serde(default)]
    channels: Vec<Conversation>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

pub struct ConversationsApi<'a> {
    client: &'a Client,
}

impl<'a> ConversationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn create(&self, name: &str, is_private: bool) -> Result<Conversation, ApiError> {
        let params = FormParams::new()
            .add("name", name)
            .add("is_private", is_private);
        let response: ChannelResponse = self.client.call("conversations.create", &params).await?;
        Ok(response.channel)
    }

    pub async fn info(&self, channel: &str) -> Result<Conversation, ApiError> {
        let params = FormParams::new().add("channel", channel);
        let response: ChannelResponse = self.client.call("conversations.info", &params).await?;
        Ok(response.channel)
    }

    pub async fn rename(&self, channel: &str, name: &str) -> Result<Conversation, ApiError> {
        let params = FormParams::new().add("channel", channel).add("name", name);
        let response: ChannelResponse = self.client.call("conversations.rename", &params).await?;
        Ok(response.channel)
    }

    pub async fn set_topic(&self, channel: &str, topic: &str) -> Result<(), ApiError> {
        let params = FormParams::new().add("channel", channel).add("topic", topic);
        self.client
            .call::<Ack>("conversations.setTopic", &params)
            .await
            .map(|_| ())
    }

    pub async fn set_purpose(&self, channel: &str, purpose: &str) -> Result<(), ApiError> {
        let params = FormParams::new()
            .add("channel", channel)
            .add("purpose", purpose);
        self.client
            .call::<Ack>("conversations.setPurpose", &params)
            .await
            .map(|_| ())
    }

    pub async fn archive(&self, channel: &str) -> Result<(), ApiError> {
        self.channel_only("conversations.archive", channel).await
    }

    pub async fn unarchive(&self, channel: &str) -> Result<(), ApiError> {
        self.channel_only("conversations.unarchive", channel).await
    }

    /// Join as the token owner
    pub async fn join(&self, channel: &str) -> Result<(), ApiError> {
        self.channel_only("conversations.join", channel).await
    }

    /// Leave as the token owner
    pub async fn leave(&self, channel: &str) -> Result<(), ApiError> {
        self.channel_only("conversations.leave", channel).await
    }

    pub async fn invite(&self, channel: &str, users: &[String]) -> Result<(), ApiError> {
        let params = FormParams::new()
            .add("channel", channel)
            .add_list("users", users);
        self.client
            .call::<Ack>("conversations.invite", &params)
            .await
            .map(|_| ())
    }

    pub async fn kick(&self, channel: &str, user: &str) -> Result<(), ApiError> {
        let params = FormParams::new().add("channel", channel).add("user", user);
        self.client
            .call::<Ack>("conversations.kick", &params)
            .await
            .map(|_| ())
    }

    /// All member IDs, following cursors until exhausted
    pub async fn members(&self, channel: &str) -> Result<Vec<String>, ApiError> {
        let mut members = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = FormParams::new()
                .add("channel", channel)
                .add("limit", PAGE_LIMIT)
                .add_optional("cursor", cursor.as_deref());
            let page: MembersPage = self.client.call("conversations.members", &params).await?;
            members.extend(page.members);

            match page.response_metadata.cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        Ok(members)
    }

    /// Public and private conversations visible to the token
    pub async fn list(&self, exclude_archived: bool) -> Result<Vec<Conversation>, ApiError> {
        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = FormParams::new()
                .add("types", "public_channel,private_channel")
                .add("exclude_archived", exclude_archived)
                .add("limit", PAGE_LIMIT)
                .add_optional("cursor", cursor.as_deref());
            let page: ChannelsPage = self.client.call("conversations.list", &params).await?;
            channels.extend(page.channels);

            match page.response_metadata.cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
        }

        Ok(channels)
    }

    async fn channel_only(&self, method: &str, channel: &str) -> Result<(), ApiError> {
        let params = FormParams::new().add("channel", channel);
        self.client.call::<Ack>(method, &params).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::client::test_client;
    use crate::api::SlackErrorCode;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn create_returns_channel() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/conversations.create")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "general-2".into()),
                Matcher::UrlEncoded("is_private".into(), "false".into()),
            ]))
            .with_body(
                r#"{"ok":true,"channel":{"id":"C1","name":"general-2","created":1700000000,
                    "creator":"U1","is_private":false,"is_archived":false,
                    "topic":{"value":"","creator":"","last_set":0},
                    "purpose":{"value":"","creator":"","last_set":0}}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let channel = client
            .conversations()
            .create("general-2", false)
            .await
            .unwrap();

        assert_eq!(channel.id, "C1");
        assert_eq!(channel.creator, "U1");
        assert!(!channel.is_archived);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn members_follows_cursor() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("POST", "/conversations.members")
            .match_body(Matcher::Regex("^channel=C1&limit=200$".into()))
            .with_body(
                r#"{"ok":true,"members":["U1","U2"],"response_metadata":{"next_cursor":"abc"}}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("POST", "/conversations.members")
            .match_body(Matcher::UrlEncoded("cursor".into(), "abc".into()))
            .with_body(r#"{"ok":true,"members":["U3"],"response_metadata":{"next_cursor":""}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let members = client.conversations().members("C1").await.unwrap();

        assert_eq!(members, vec!["U1", "U2", "U3"]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn info_surfaces_channel_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/conversations.info")
            .with_body(r#"{"ok":false,"error":"channel_not_found"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.conversations().info("C404").await.unwrap_err();

        assert!(err.is_code(&SlackErrorCode::ChannelNotFound));
    }

    #[tokio::test]
    async fn invite_sends_comma_separated_users() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/conversations.invite")
            .match_body(Matcher::UrlEncoded("users".into(), "U1,U2".into()))
            .with_body(r#"{"ok":true,"channel":{"id":"C1"}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        client
            .conversations()
            .invite("C1", &["U1".to_string(), "U2".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
