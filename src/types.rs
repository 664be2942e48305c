use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single visitor line destined for the remote log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    text: String,
    /// ISO 8601 UTC timestamp
    timestamp: String,
}

impl LogEntry {
    pub fn new(text: String, timestamp: String) -> Self {
        Self { text, timestamp }
    }

    /// Stamps `text` with the current UTC time, millisecond precision.
    pub fn now(text: String) -> Self {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Self::new(text, timestamp)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn render(&self) -> String {
        format!("{} - {}\n", self.text, self.timestamp)
    }
}

/// Snapshot of the remote log file taken by a single fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFileState {
    /// Blob sha; `None` when the file does not exist yet.
    pub content_token: Option<String>,
    pub decoded_text: String,
}

impl RemoteFileState {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn exists(&self) -> bool {
        self.content_token.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentsResponse {
    pub sha: String,
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentsRequest {
    pub message: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    pub committer: Committer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// Fields a client may send in the JSON body. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpPayload {
    #[serde(default)]
    pub ipv4: Option<String>,
    #[serde(default)]
    pub ipv6: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}
