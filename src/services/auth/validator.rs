//! Claims policies run after a token has been verified.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::services::auth::{
    access::AccessLoader,
    error::AuthError,
    token::Claims,
    visitor::{AuthScope, Visitor},
};

/// Policy applied to verified claims.
///
/// Receives the request scope built so far and returns it augmented (or an
/// error that terminates the pipeline). Swapping the policy does not touch
/// token discovery or verification.
#[async_trait]
pub trait ClaimsValidator: Send + Sync {
    async fn validate(&self, claims: &Claims, scope: AuthScope) -> Result<AuthScope, AuthError>;
}

/// Default policy: resolve the subject's access profile and attach a `Visitor`.
#[derive(Clone)]
pub struct AccessProfileValidator {
    access: Arc<dyn AccessLoader>,
}

impl std::fmt::Debug for AccessProfileValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessProfileValidator").finish_non_exhaustive()
    }
}

impl AccessProfileValidator {
    pub fn new(access: Arc<dyn AccessLoader>) -> Self {
        Self { access }
    }
}

/// `sub` must be present and a string.
pub fn subject(claims: &Claims) -> Result<&str, AuthError> {
    match claims.get("sub") {
        Some(Value::String(sub)) if sub.is_empty() => Err(AuthError::SubInvalid),
        Some(Value::String(sub)) => Ok(sub),
        _ => Err(AuthError::SubNotFound),
    }
}

#[async_trait]
impl ClaimsValidator for AccessProfileValidator {
    async fn validate(&self, claims: &Claims, scope: AuthScope) -> Result<AuthScope, AuthError> {
        let sub = subject(claims)?;

        let credential = scope.credential().cloned().ok_or(AuthError::NoTokenFound)?;

        let profile = self.access.load(sub, credential.as_str()).await?;

        // Access lookup precedes the numeric check of the subject.
        let user_id: i64 = sub.parse()?;

        let visitor = Visitor::new(user_id, credential, profile);
        Ok(scope.attach_visitor(visitor))
    }
}
