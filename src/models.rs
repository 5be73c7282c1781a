//! Public data models for the disposable-inbox session.

use std::time::Duration;

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::constants::{
    default_timeout, DEFAULT_BASE_URL, FALLBACK_BODY, FALLBACK_SENDER, FALLBACK_SUBJECT,
    SESSION_TTL_SECS,
};

/// Client configuration: backend location, request timeout, optional proxy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the provisioning backend.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Proxy URL, if requests should be routed through one.
    pub proxy_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: default_timeout(),
            proxy_url: None,
        }
    }
}

/// Address and inbox credential pair issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisionedAddress {
    /// The disposable email address.
    #[serde(rename = "email")]
    pub address: String,
    /// Opaque token authenticating inbox fetches for this address.
    #[serde(rename = "token")]
    pub credential: String,
}

/// Raw message record as returned by the backend. Every field is optional
/// on the wire; [`Message::from_raw`] applies the display fallbacks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: Option<String>,
    pub from_email: Option<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
    pub read: Option<bool>,
}

/// A normalized inbox message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Unique id within the session; the sole de-duplication key.
    pub id: String,
    /// Sender address.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Message body text.
    pub body: String,
    /// Timestamp string as provided by the backend (RFC3339 when generated).
    pub received_at: String,
    /// Whether the message has been opened.
    pub read: bool,
}

impl Message {
    /// Normalize a raw record. Absent or empty fields get display fallbacks;
    /// a missing id or timestamp is generated locally.
    pub fn from_raw(raw: RawMessage) -> Self {
        Self {
            id: non_empty(raw.id).unwrap_or_else(generate_id),
            sender: non_empty(raw.from_email).unwrap_or_else(|| FALLBACK_SENDER.to_string()),
            subject: non_empty(raw.subject).unwrap_or_else(|| FALLBACK_SUBJECT.to_string()),
            body: non_empty(raw.content).unwrap_or_else(|| FALLBACK_BODY.to_string()),
            received_at: non_empty(raw.created_at).unwrap_or_else(|| Utc::now().to_rfc3339()),
            read: raw.read.unwrap_or(false),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let raw: String = (0..16).map(|_| rng.sample(Alphanumeric) as char).collect();
    raw.to_lowercase()
}

/// The active mailbox context: current address, its credential, and the
/// remaining lifetime in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub address: String,
    pub credential: String,
    pub ttl_remaining: u32,
}

impl Session {
    /// A fresh session with a full lifetime.
    pub fn new(address: String, credential: String) -> Self {
        Self {
            address,
            credential,
            ttl_remaining: SESSION_TTL_SECS,
        }
    }
}

/// Read-only projection of the controller state for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxSnapshot {
    /// Current disposable address, empty until the first session exists.
    pub address: String,
    /// Remaining lifetime rendered as `m:ss`.
    pub countdown: String,
    /// Messages, newest-merged first.
    pub messages: Vec<Message>,
    /// Id of the currently selected message, if any.
    pub selected: Option<String>,
    /// An address rotation is in flight.
    pub loading: bool,
    /// A manual inbox refresh is in flight.
    pub refreshing: bool,
    /// Last surfaced error, cleared on the next successful operation.
    pub error: Option<String>,
}

impl InboxSnapshot {
    /// The selected message, when it is present in the inbox.
    pub fn selected_message(&self) -> Option<&Message> {
        let id = self.selected.as_deref()?;
        self.messages.iter().find(|m| m.id == id)
    }
}
