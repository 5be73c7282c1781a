use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

pub const CREATE_ADDRESS_PATH: &str = "/api/create-email";
pub const LIST_MESSAGES_PATH: &str = "/api/emails";

/// Public domain the backend issues addresses under.
pub const ADDRESS_DOMAIN: &str = "gmail.com";
pub const ADDRESS_LOCAL_LEN: usize = 10;

/// Lifetime of a provisioned mailbox, in seconds.
pub const SESSION_TTL_SECS: u32 = 600;
pub const POLL_INTERVAL: Duration = Duration::from_secs(15);
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

pub const FALLBACK_SENDER: &str = "Unknown Sender";
pub const FALLBACK_SUBJECT: &str = "(No Subject)";
pub const FALLBACK_BODY: &str = "(No Content)";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json"),
    ("user-agent", "tempmail-client-rs/0.1"),
];

pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for &(k, v) in DEFAULT_HEADERS {
        let name = HeaderName::from_static(k);
        if let Ok(val) = HeaderValue::from_str(v) {
            headers.insert(name, val);
        }
    }
    headers
}

pub fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}
