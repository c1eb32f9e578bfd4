use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation};

use crate::services::auth::{error::AuthError, keys::KeyResolver};

/// Decoded claim set of a verified token.
pub type Claims = serde_json::Map<String, serde_json::Value>;

const RSA_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// RSA token verifier.
///
/// The verification key is looked up per token through the `kid` header, so
/// the verifier itself holds no key material.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeyResolver>,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(keys: Arc<dyn KeyResolver>, leeway_seconds: u64) -> Self {
        Self {
            keys,
            leeway_seconds,
        }
    }

    /// Verify the signature of `token` and return its claims.
    ///
    /// - the header must carry a non-empty `kid`, otherwise no key is fetched
    /// - the signature algorithm is the one declared in the header, restricted
    ///   to the RSA family
    /// - `exp` / `nbf` are checked when present but not required
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token)?;

        let kid = match header.kid.as_deref() {
            Some(kid) if !kid.is_empty() => kid,
            _ => return Err(AuthError::InvalidKey),
        };

        if !RSA_ALGORITHMS.contains(&header.alg) {
            return Err(AuthError::TokenInvalid(format!(
                "unsupported signing method {:?}",
                header.alg
            )));
        }

        let key = self.keys.resolve(kid).await?;

        let data = jsonwebtoken::decode::<Claims>(token, &key, &self.validation(header.alg))?;
        Ok(data.claims)
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = self.leeway_seconds;
        validation
    }
}
