//! Public key lookup against the remote key service.
//!
//! `GET {base}/keys/{kid}` answers
//! `{"message", "status", "data": {"keyID", "createdOn", "sourceID", "key"}}`
//! where `key` is a PEM encoded RSA public key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use url::Url;

use crate::services::auth::{error::AuthError, service_url};

#[derive(Debug, Deserialize)]
pub struct PublicKeyResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<PublicKeyRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyRecord {
    #[serde(rename = "keyID", default)]
    pub key_id: String,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(rename = "sourceID", default)]
    pub source_id: String,
    #[serde(default)]
    pub key: String,
}

/// Resolves a key id to a verification key.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, key_id: &str) -> Result<DecodingKey, AuthError>;
}

/// `KeyResolver` backed by the remote key service.
///
/// Every call goes to the network; wrap it in `CachedKeyResolver` to reuse
/// keys between requests.
#[derive(Debug, Clone)]
pub struct HttpKeyResolver {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpKeyResolver {
    pub fn new(base_url: Url, http: reqwest::Client) -> Self {
        Self { base_url, http }
    }

    /// Fetch the raw key record for `key_id`.
    pub async fn fetch(&self, key_id: &str) -> Result<PublicKeyRecord, AuthError> {
        let url = service_url(&self.base_url, &["keys", key_id])
            .ok_or(AuthError::ServiceUrl("keys server"))?;

        tracing::debug!(%url, "fetching public key");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(AuthError::KeyFetch)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AuthError::KeyRetrievalFailed { status });
        }

        let body = response.text().await.map_err(AuthError::KeyFetch)?;
        let payload: PublicKeyResponse =
            serde_json::from_str(&body).map_err(AuthError::KeyDecode)?;

        match payload.data {
            Some(record) if !record.key.is_empty() => Ok(record),
            _ => Err(AuthError::UnexpectedKeyResponse(body)),
        }
    }
}

#[async_trait]
impl KeyResolver for HttpKeyResolver {
    async fn resolve(&self, key_id: &str) -> Result<DecodingKey, AuthError> {
        let record = self.fetch(key_id).await?;
        parse_public_key(&record.key)
    }
}

pub fn parse_public_key(pem: &str) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
        tracing::warn!(error = %e, "public key is not a valid RSA PEM");
        AuthError::InvalidKey
    })
}
