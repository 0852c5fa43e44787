//! Common types and utilities for the Slack Web API

use serde::Deserialize;

/// Every Web API method answers with this envelope; method-specific fields
/// sit next to `ok` at the top level.
#[derive(Debug, Deserialize)]
pub struct SlackEnvelope {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of methods whose success carries nothing we need
#[derive(Debug, Deserialize)]
pub struct Ack {}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl ResponseMetadata {
    pub fn cursor(&self) -> Option<&str> {
        if self.next_cursor.is_empty() {
            None
        } else {
            Some(&self.next_cursor)
        }
    }
}

/// Form-encoded method arguments
#[derive(Debug, Clone, Default)]
pub struct FormParams {
    params: Vec<(String, String)>,
}

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    /// Slack takes lists of IDs as a single comma-separated argument
    pub fn add_list<K: Into<String>, S: AsRef<str>>(mut self, key: K, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((key.into(), joined));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Link to the reference page of a Web API method
pub fn method_doc_url(method: &str) -> String {
    format!("https://api.slack.com/methods/{}", method)
}
