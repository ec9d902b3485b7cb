//! reqwest-backed data source

use super::{DataSource, Endpoint};
use crate::config::AiqConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

/// Build the HTTP client shared by the token exchange and all queries.
pub fn build_client(config: &AiqConfig) -> Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Join a relative API path onto the configured base URL.
pub fn endpoint_url(base: &Url, path: &str) -> Result<Url> {
    // A base without a trailing slash would lose its last segment on join.
    let base = if base.path().ends_with('/') {
        base.clone()
    } else {
        let mut base = base.clone();
        base.set_path(&format!("{}/", base.path()));
        base
    };
    base.join(path)
        .map_err(|e| Error::Config(format!("Invalid endpoint path '{}': {}", path, e)))
}

pub struct HttpDataSource {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl HttpDataSource {
    pub fn new(client: Client, base_url: Url, access_token: String) -> Self {
        Self {
            client,
            base_url,
            access_token,
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value> {
        let url = endpoint_url(&self.base_url, &endpoint.path())?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(&endpoint.query())
            .header("accept", "application/json")
            .header("authorizationToken", &self.access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        trace!("{} answered {} with {} bytes", endpoint.kind(), status, body.len());

        // Error documents usually come with a 4xx status, so the body is
        // decoded before the status is considered.
        match serde_json::from_str::<Value>(&body) {
            Ok(document) => Ok(document),
            Err(_) if !status.is_success() => Err(Error::HttpStatus(format!(
                "{} returned {}: {}",
                endpoint.kind(),
                status,
                body.chars().take(200).collect::<String>()
            ))),
            Err(e) => Err(Error::Serialization(e)),
        }
    }
}
