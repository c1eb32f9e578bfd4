//! Entitlement lookup against the remote access service.
//!
//! `GET {base}/access/{subject}` with the caller's credential in the `iam`
//! header. The service answers `{"message", "status", "data"}` and only a
//! literal `"success"` status is accepted.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::services::auth::{error::AuthError, service_url};

/// Role grants of a subject.
///
/// Every role is independently optional: `None` means the role is not
/// granted, which is different from a granted role with an empty scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessProfile {
    #[serde(rename = "SuperUser", default)]
    pub super_user: bool,
    #[serde(rename = "Admin", default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<EntityScope>,
    #[serde(rename = "VOAdmin", default, skip_serializing_if = "Option::is_none")]
    pub vo_admin: Option<EntityScope>,
    #[serde(rename = "VONoChildAdmin", default, skip_serializing_if = "Option::is_none")]
    pub vo_no_child_admin: Option<EntityScope>,
    #[serde(rename = "FSAdmin", default, skip_serializing_if = "Option::is_none")]
    pub fs_admin: Option<FundSourceScope>,
    #[serde(rename = "FSVOAdmin", default, skip_serializing_if = "Option::is_none")]
    pub fs_vo_admin: Option<FundSourceScope>,
    #[serde(rename = "Teacher", default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<ClassScope>,
    #[serde(rename = "CoTeacher", default, skip_serializing_if = "Option::is_none")]
    pub co_teacher: Option<ClassScope>,
    #[serde(rename = "AssistantTeacher", default, skip_serializing_if = "Option::is_none")]
    pub assistant_teacher: Option<ClassScope>,
    #[serde(rename = "TeamMember", default, skip_serializing_if = "Option::is_none")]
    pub team_member: Option<KidScope>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityScope {
    #[serde(
        rename = "ent",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub entities: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSourceScope {
    #[serde(
        rename = "ent",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub entities: Vec<i64>,
    #[serde(
        rename = "fundSrc",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub fund_sources: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassScope {
    #[serde(
        rename = "cls",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub classes: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KidScope {
    #[serde(
        rename = "kid",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub kids: Vec<i64>,
}

// `null` and a missing list both mean no scope.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<i64>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// The access service has been seen answering with capitalised keys too.
#[derive(Debug, Deserialize)]
struct AccessResponse {
    #[serde(default, alias = "Message")]
    message: String,
    #[serde(default, alias = "Status")]
    status: String,
    #[serde(default, alias = "Data")]
    data: Option<AccessProfile>,
}

const SUCCESS: &str = "success";

/// Source of access profiles, one lookup per subject.
#[async_trait]
pub trait AccessLoader: Send + Sync {
    async fn load(&self, subject_id: &str, credential: &str) -> Result<AccessProfile, AuthError>;
}

/// `AccessLoader` backed by the remote access service.
#[derive(Debug, Clone)]
pub struct HttpAccessLoader {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpAccessLoader {
    pub fn new(base_url: Url, http: reqwest::Client) -> Self {
        Self { base_url, http }
    }
}

#[async_trait]
impl AccessLoader for HttpAccessLoader {
    async fn load(&self, subject_id: &str, credential: &str) -> Result<AccessProfile, AuthError> {
        let url = service_url(&self.base_url, &["access", subject_id])
            .ok_or(AuthError::ServiceUrl("authorization service"))?;

        tracing::debug!(%url, "loading access profile");

        let response = self
            .http
            .get(url)
            .header("iam", credential)
            .send()
            .await
            .map_err(AuthError::AccessFetch)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AuthError::AccessRequestFailed { status });
        }

        let body = response.bytes().await.map_err(AuthError::AccessFetch)?;
        let payload: AccessResponse =
            serde_json::from_slice(&body).map_err(AuthError::AccessDecode)?;

        if payload.status != SUCCESS {
            return Err(AuthError::AccessDenied(payload.message));
        }

        Ok(payload.data.unwrap_or_default())
    }
}
