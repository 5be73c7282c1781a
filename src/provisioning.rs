//! Mail provisioning backend: the interface the session controller consumes
//! and the HTTP adapter that talks to a TempMail API.

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use reqwest::{Client, ClientBuilder};
use tracing::debug;

use crate::constants::{
    default_headers, ADDRESS_DOMAIN, CREATE_ADDRESS_PATH, LIST_MESSAGES_PATH,
};
use crate::error::{Error, Result};
use crate::models::{Config, ProvisionedAddress, RawMessage};

/// Backend operations the controller depends on.
#[async_trait]
pub trait ProvisioningService: Send + Sync {
    /// Provision a fresh disposable address with its inbox credential.
    async fn create_address(&self) -> Result<ProvisionedAddress>;

    /// List the messages currently held for `credential`.
    async fn list_messages(&self, credential: &str) -> Result<Vec<RawMessage>>;
}

/// HTTP implementation of [`ProvisioningService`] against the TempMail API.
pub struct HttpProvisioningService {
    config: Config,
    client: Client,
}

impl HttpProvisioningService {
    pub fn new(config: Option<Config>) -> Result<Self> {
        let cfg = config.unwrap_or_default();

        let mut builder = ClientBuilder::new()
            .timeout(cfg.timeout)
            .default_headers(default_headers());

        if let Some(proxy) = &cfg.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy).map_err(Error::Http)?);
        }

        let client = builder.build().map_err(Error::Http)?;

        Ok(Self {
            config: cfg,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ProvisioningService for HttpProvisioningService {
    async fn create_address(&self) -> Result<ProvisionedAddress> {
        let url = self.endpoint(CREATE_ADDRESS_PATH);
        let resp = self.client.post(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status { status, body });
        }

        let provisioned: ProvisionedAddress =
            serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;
        debug!(address = %provisioned.address, "provisioned new address");
        Ok(provisioned)
    }

    async fn list_messages(&self, credential: &str) -> Result<Vec<RawMessage>> {
        let url = self.endpoint(LIST_MESSAGES_PATH);
        let resp = self
            .client
            .get(&url)
            .query(&[("token", credential)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
    }
}

/// Generate a random address at the public domain: a fixed-length lowercase
/// alphanumeric local part. Not collision-resistant; do not rely on it for
/// privacy isolation.
pub fn generate_random_address(len: usize) -> String {
    let length = len.max(6).min(32);
    let mut rng = rand::thread_rng();
    let local: String = (0..length)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect();
    format!("{}@{}", local.to_lowercase(), ADDRESS_DOMAIN)
}
