//! Stage composition: locate -> verify -> validate.
//!
//! Each stage either advances the request or terminates it with an
//! `AuthError`; nothing is retried.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, Uri};

use crate::services::auth::{
    error::AuthError,
    locator::TokenLocator,
    token::{Claims, TokenVerifier},
    validator::ClaimsValidator,
    visitor::{AuthScope, Credential},
};

/// Pipeline states, used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    NoToken,
    TokenFound,
    Verified,
    ClaimsValidated,
    VisitorAttached,
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoToken => "no_token",
            Self::TokenFound => "token_found",
            Self::Verified => "verified",
            Self::ClaimsValidated => "claims_validated",
            Self::VisitorAttached => "visitor_attached",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct AuthPipeline {
    locator: TokenLocator,
    verifier: TokenVerifier,
    validator: Arc<dyn ClaimsValidator>,
}

impl fmt::Debug for AuthPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthPipeline")
            .field("locator", &self.locator)
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl AuthPipeline {
    pub fn new(
        locator: TokenLocator,
        verifier: TokenVerifier,
        validator: Arc<dyn ClaimsValidator>,
    ) -> Self {
        Self {
            locator,
            verifier,
            validator,
        }
    }

    pub fn locate(&self, headers: &HeaderMap, uri: &Uri) -> Result<Credential, AuthError> {
        match self.locator.locate(headers, uri) {
            Some((source, credential)) => {
                tracing::debug!(?source, "credential located");
                Ok(credential)
            }
            None => Err(AuthError::NoTokenFound),
        }
    }

    pub async fn verify(&self, credential: &Credential) -> Result<Claims, AuthError> {
        self.verifier.verify(credential.as_str()).await
    }

    pub async fn validate(&self, claims: &Claims, scope: AuthScope) -> Result<AuthScope, AuthError> {
        self.validator.validate(claims, scope).await
    }

    /// Run every stage for one request.
    ///
    /// On error, returns the stage the request was in when it was rejected.
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        uri: &Uri,
    ) -> Result<AuthScope, (AuthStage, AuthError)> {
        let credential = self
            .locate(headers, uri)
            .map_err(|e| (AuthStage::NoToken, e))?;

        let claims = self
            .verify(&credential)
            .await
            .map_err(|e| (AuthStage::TokenFound, e))?;

        let scope = self
            .validate(&claims, AuthScope::with_credential(credential))
            .await
            .map_err(|e| (AuthStage::Verified, e))?;

        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
    use serde_json::json;

    use super::*;
    use crate::services::auth::{keys::KeyResolver, keys::parse_public_key, visitor::Visitor};

    const PRIVATE_PEM: &str = include_str!("../../../tests/fixtures/rsa_private.pem");
    const PUBLIC_PEM: &str = include_str!("../../../tests/fixtures/rsa_public.pem");

    #[derive(Default)]
    struct Keys {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl KeyResolver for Keys {
        async fn resolve(&self, _key_id: &str) -> Result<DecodingKey, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            parse_public_key(PUBLIC_PEM)
        }
    }

    // Accepts any verified token and records the subject as user id 0.
    struct AcceptAll;

    #[async_trait]
    impl ClaimsValidator for AcceptAll {
        async fn validate(&self, _claims: &Claims, scope: AuthScope) -> Result<AuthScope, AuthError> {
            let credential = scope.credential().cloned().ok_or(AuthError::NoTokenFound)?;
            Ok(scope.attach_visitor(Visitor::new(0, credential, Default::default())))
        }
    }

    struct RejectAll;

    #[async_trait]
    impl ClaimsValidator for RejectAll {
        async fn validate(&self, _claims: &Claims, _scope: AuthScope) -> Result<AuthScope, AuthError> {
            Err(AuthError::policy("unable to validate (fake err)"))
        }
    }

    fn pipeline(keys: Arc<Keys>, validator: Arc<dyn ClaimsValidator>) -> AuthPipeline {
        AuthPipeline::new(TokenLocator::default(), TokenVerifier::new(keys, 0), validator)
    }

    fn token() -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some("k1".into());
        let key = EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap();
        jsonwebtoken::encode(&header, &json!({"sub": "7"}), &key).unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn no_token_stops_before_key_lookup() {
        let keys = Arc::new(Keys::default());
        let pipeline = pipeline(keys.clone(), Arc::new(AcceptAll));

        let (stage, err) = pipeline
            .authenticate(&HeaderMap::new(), &"/".parse().unwrap())
            .await
            .unwrap_err();

        assert_eq!(stage, AuthStage::NoToken);
        assert!(matches!(err, AuthError::NoTokenFound));
        assert_eq!(keys.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn policy_rejection_is_reported_after_verification() {
        let pipeline = pipeline(Arc::new(Keys::default()), Arc::new(RejectAll));

        let (stage, err) = pipeline
            .authenticate(&bearer(&token()), &"/".parse().unwrap())
            .await
            .unwrap_err();

        assert_eq!(stage, AuthStage::Verified);
        assert_eq!(err.to_string(), "unable to validate (fake err)");
    }

    #[tokio::test]
    async fn accepted_request_carries_visitor_with_credential() {
        let pipeline = pipeline(Arc::new(Keys::default()), Arc::new(AcceptAll));
        let token = token();

        let scope = pipeline
            .authenticate(&bearer(&token), &"/".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(scope.visitor().unwrap().signed_credential(), token);
    }

    #[test]
    fn stage_names() {
        assert_eq!(AuthStage::NoToken.to_string(), "no_token");
        assert_eq!(AuthStage::VisitorAttached.to_string(), "visitor_attached");
    }
}
