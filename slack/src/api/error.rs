use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{code}")]
    Slack { method: String, code: SlackErrorCode },

    #[error("API returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,
}

impl ApiError {
    /// The Slack error code, if the remote side answered `ok: false`
    pub fn code(&self) -> Option<&SlackErrorCode> {
        match self {
            ApiError::Slack { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_code(&self, expected: &SlackErrorCode) -> bool {
        self.code() == Some(expected)
    }
}

/// Error codes returned in the `error` field of a failed Slack Web API call.
///
/// Only the codes this provider branches on get their own variant; anything
/// else is carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlackErrorCode {
    AlreadyArchived,
    NotArchived,
    AlreadyInChannel,
    NotInChannel,
    AlreadyDisabled,
    AlreadyEnabled,
    ChannelNotFound,
    UserNotFound,
    SubteamNotFound,
    NameTaken,
    InvalidAuth,
    NotAuthed,
    AccountInactive,
    MissingScope,
    Ratelimited,
    Other(String),
}

impl SlackErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            SlackErrorCode::AlreadyArchived => "already_archived",
            SlackErrorCode::NotArchived => "not_archived",
            SlackErrorCode::AlreadyInChannel => "already_in_channel",
            SlackErrorCode::NotInChannel => "not_in_channel",
            SlackErrorCode::AlreadyDisabled => "already_disabled",
            SlackErrorCode::AlreadyEnabled => "already_enabled",
            SlackErrorCode::ChannelNotFound => "channel_not_found",
            SlackErrorCode::UserNotFound => "user_not_found",
            SlackErrorCode::SubteamNotFound => "subteam_not_found",
            SlackErrorCode::NameTaken => "name_taken",
            SlackErrorCode::InvalidAuth => "invalid_auth",
            SlackErrorCode::NotAuthed => "not_authed",
            SlackErrorCode::AccountInactive => "account_inactive",
            SlackErrorCode::MissingScope => "missing_scope",
            SlackErrorCode::Ratelimited => "ratelimited",
            SlackErrorCode::Other(code) => code,
        }
    }
}

impl From<&str> for SlackErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "already_archived" => SlackErrorCode::AlreadyArchived,
            "not_archived" => SlackErrorCode::NotArchived,
            "already_in_channel" => SlackErrorCode::AlreadyInChannel,
            "not_in_channel" => SlackErrorCode::NotInChannel,
            "already_disabled" => SlackErrorCode::AlreadyDisabled,
            "already_enabled" => SlackErrorCode::AlreadyEnabled,
            "channel_not_found" => SlackErrorCode::ChannelNotFound,
            "user_not_found" => SlackErrorCode::UserNotFound,
            "subteam_not_found" => SlackErrorCode::SubteamNotFound,
            "name_taken" => SlackErrorCode::NameTaken,
            "invalid_auth" => SlackErrorCode::InvalidAuth,
            "not_authed" => SlackErrorCode::NotAuthed,
            "account_inactive" => SlackErrorCode::AccountInactive,
            "missing_scope" => SlackErrorCode::MissingScope,
            "ratelimited" => SlackErrorCode::Ratelimited,
            other => SlackErrorCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SlackErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
