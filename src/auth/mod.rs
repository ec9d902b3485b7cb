//! Token storage and the refresh-token exchange

use crate::document::display_value;
use crate::error::{Error, Result};
use crate::source::http::endpoint_url;
use reqwest::Client;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

pub const TOKEN_EXCHANGE_PATH: &str = "v1/tokens/accessToken";

/// Refresh and access tokens kept as single-line text files.
#[derive(Debug, Clone)]
pub struct TokenStore {
    refresh_path: PathBuf,
    access_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    /// Present when the service rotated the refresh token.
    pub refresh_token: Option<String>,
}

impl TokenStore {
    pub fn new(refresh_path: PathBuf, access_path: PathBuf) -> Self {
        Self {
            refresh_path,
            access_path,
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_path.exists()
    }

    pub fn refresh_token(&self) -> Result<String> {
        read_token(&self.refresh_path).map_err(|_| {
            Error::Authentication(format!(
                "Refresh token not found at {}",
                self.refresh_path.display()
            ))
        })
    }

    pub fn access_token(&self) -> Result<String> {
        read_token(&self.access_path).map_err(|_| {
            Error::Authentication(format!(
                "Access token not found at {}; run with --refresh",
                self.access_path.display()
            ))
        })
    }

    pub fn store_refresh_token(&self, token: &str) -> Result<()> {
        write_token(&self.refresh_path, token)
    }

    pub fn store_access_token(&self, token: &str) -> Result<()> {
        write_token(&self.access_path, token)
    }

    /// Exchange the stored refresh token and persist whatever comes back.
    pub async fn refresh(&self, client: &Client, base_url: &Url) -> Result<TokenPair> {
        let refresh_token = self.refresh_token()?;
        let pair = exchange(client, base_url, &refresh_token).await?;

        self.store_access_token(&pair.access_token)?;
        if let Some(rotated) = &pair.refresh_token {
            self.store_refresh_token(rotated)?;
        }
        info!("Access token refreshed");
        Ok(pair)
    }
}

fn read_token(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    let token = content.lines().next().unwrap_or_default().trim().to_string();
    if token.is_empty() {
        return Err(Error::Authentication(format!(
            "Token file {} is empty",
            path.display()
        )));
    }
    Ok(token)
}

fn write_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, token.trim())?;
    Ok(())
}

/// POST the refresh token and read the new token pair from the reply.
pub async fn exchange(client: &Client, base_url: &Url, refresh_token: &str) -> Result<TokenPair> {
    let url = endpoint_url(base_url, TOKEN_EXCHANGE_PATH)?;
    debug!("POST {}", url);

    let body = client
        .post(url)
        .json(&json!({ "refresh_token": refresh_token }))
        .send()
        .await?
        .text()
        .await?;

    let document: Value = serde_json::from_str(&body)
        .map_err(|e| Error::Authentication(format!("Unreadable token response: {}", e)))?;
    parse_token_response(&document)
}

/// An `error` key anywhere in the reply is fatal.
pub fn parse_token_response(document: &Value) -> Result<TokenPair> {
    if let Some(error) = document.get("error") {
        return Err(Error::Authentication(display_value(error)));
    }

    let access_token = document
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Authentication("No access token in response".to_string()))?
        .to_string();

    let refresh_token = document
        .get("refresh_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> TokenStore {
        TokenStore::new(
            dir.path().join("auth").join("RefreshToken.txt"),
            dir.path().join("auth").join("AccessToken.txt"),
        )
    }

    #[test]
    fn test_store_and_read_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(!store.has_refresh_token());

        store.store_refresh_token("refresh-abc\n").unwrap();
        store.store_access_token("access-xyz").unwrap();

        assert!(store.has_refresh_token());
        assert_eq!(store.refresh_token().unwrap(), "refresh-abc");
        assert_eq!(store.access_token().unwrap(), "access-xyz");
    }

    #[test]
    fn test_missing_access_token_is_auth_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = store(&temp_dir).access_token().unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_parse_token_response() {
        let pair = parse_token_response(&json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh"
        }))
        .unwrap();
        assert_eq!(pair.access_token, "new-access");
        assert_eq!(pair.refresh_token.as_deref(), Some("new-refresh"));

        let pair = parse_token_response(&json!({"access_token": "only-access"})).unwrap();
        assert!(pair.refresh_token.is_none());
    }

    #[test]
    fn test_parse_token_error() {
        let err = parse_token_response(&json!({"error": "invalid_grant"})).unwrap_err();
        assert_eq!(err.to_string(), "Authentication error: invalid_grant");

        let err = parse_token_response(&json!({})).unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }
}
