use serde::Serialize;

use crate::services::auth::access::AccessProfile;

/// Raw signed credential as found on the inbound request.
///
/// Stored in request extensions by the locate stage and read back by the
/// verify stage. Debug output never prints the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

/// Identity of the caller, attached to the request once every stage passed.
///
/// Fields are private so a `Visitor` can only come out of `Visitor::new`,
/// which is only reached after verification and the access lookup succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visitor {
    #[serde(rename = "UserID")]
    user_id: i64,
    #[serde(skip_serializing)]
    signed_credential: Credential,
    #[serde(rename = "AccessProfile")]
    access_profile: AccessProfile,
}

impl Visitor {
    pub fn new(user_id: i64, signed_credential: Credential, access_profile: AccessProfile) -> Self {
        Self {
            user_id,
            signed_credential,
            access_profile,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn signed_credential(&self) -> &str {
        self.signed_credential.as_str()
    }

    pub fn access_profile(&self) -> &AccessProfile {
        &self.access_profile
    }
}

/// Typed per-request state threaded through the pipeline stages.
///
/// The locate stage fills `credential`; the claims policy fills `visitor`.
#[derive(Debug, Clone, Default)]
pub struct AuthScope {
    credential: Option<Credential>,
    visitor: Option<Visitor>,
}

impl AuthScope {
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            visitor: None,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn visitor(&self) -> Option<&Visitor> {
        self.visitor.as_ref()
    }

    pub fn attach_visitor(mut self, visitor: Visitor) -> Self {
        self.visitor = Some(visitor);
        self
    }

    pub fn into_visitor(self) -> Option<Visitor> {
        self.visitor
    }
}
