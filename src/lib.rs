pub mod constants;
pub mod controller;
pub mod error;
pub mod format;
pub mod models;
pub mod provisioning;

pub use constants::{
    default_headers, default_timeout, ADDRESS_DOMAIN, DEFAULT_BASE_URL, DEFAULT_HEADERS,
    DEFAULT_TIMEOUT_SECS, POLL_INTERVAL, SESSION_TTL_SECS,
};
pub use controller::{MailboxController, SyncKind};
pub use error::Error;
pub use format::{format_countdown, format_received};
pub use models::{Config, InboxSnapshot, Message, ProvisionedAddress, RawMessage, Session};
pub use provisioning::{generate_random_address, HttpProvisioningService, ProvisioningService};
