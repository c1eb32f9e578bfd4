//! TTL caching decorators for the remote lookups.
//!
//! Off by default: without them every request fetches its key and access
//! profile again. Failures are never cached.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;

use crate::services::auth::{
    access::{AccessLoader, AccessProfile},
    error::AuthError,
    keys::KeyResolver,
};
use crate::services::cache::TtlCache;

/// Caches resolved keys by key id.
pub struct CachedKeyResolver<R> {
    inner: R,
    cache: TtlCache<String, DecodingKey>,
}

impl<R: KeyResolver> CachedKeyResolver<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }
}

#[async_trait]
impl<R: KeyResolver> KeyResolver for CachedKeyResolver<R> {
    async fn resolve(&self, key_id: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cache.get(&key_id.to_string()).await {
            tracing::debug!(key_id, "public key cache hit");
            return Ok(key);
        }

        let key = self.inner.resolve(key_id).await?;
        self.cache.insert(key_id.to_string(), key.clone()).await;
        Ok(key)
    }
}

/// Caches access profiles by subject id.
pub struct CachedAccessLoader<L> {
    inner: L,
    cache: TtlCache<String, AccessProfile>,
}

impl<L: AccessLoader> CachedAccessLoader<L> {
    pub fn new(inner: L, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }
}

#[async_trait]
impl<L: AccessLoader> AccessLoader for CachedAccessLoader<L> {
    async fn load(&self, subject_id: &str, credential: &str) -> Result<AccessProfile, AuthError> {
        if let Some(profile) = self.cache.get(&subject_id.to_string()).await {
            tracing::debug!(subject_id, "access profile cache hit");
            return Ok(profile);
        }

        let profile = self.inner.load(subject_id, credential).await?;
        self.cache
            .insert(subject_id.to_string(), profile.clone())
            .await;
        Ok(profile)
    }
}
