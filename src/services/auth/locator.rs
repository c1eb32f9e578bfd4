//! Credential discovery on inbound requests.
//!
//! Sources are tried in order and the first non-empty value wins:
//! `Authorization` header, `iam` query parameter, `iam` cookie, `iam` header.

use axum::http::{HeaderMap, Uri, header};
use axum_extra::extract::cookie::CookieJar;

use crate::services::auth::visitor::Credential;

/// Conventional name of the credential carrier (query, cookie and header).
pub const IAM: &str = "iam";

const BEARER_PREFIX: &str = "bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    AuthorizationHeader,
    QueryParam,
    Cookie,
    IamHeader,
}

impl TokenSource {
    pub const DEFAULT_ORDER: [TokenSource; 4] = [
        TokenSource::AuthorizationHeader,
        TokenSource::QueryParam,
        TokenSource::Cookie,
        TokenSource::IamHeader,
    ];

    /// Raw value from this source; empty when absent.
    pub fn find(self, headers: &HeaderMap, uri: &Uri) -> String {
        match self {
            Self::AuthorizationHeader => from_header(headers, header::AUTHORIZATION.as_str()),
            Self::QueryParam => from_query(uri),
            Self::Cookie => from_cookie(headers),
            Self::IamHeader => from_header(headers, IAM),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenLocator {
    sources: Vec<TokenSource>,
}

impl Default for TokenLocator {
    fn default() -> Self {
        Self::new(TokenSource::DEFAULT_ORDER.to_vec())
    }
}

impl TokenLocator {
    pub fn new(sources: Vec<TokenSource>) -> Self {
        Self { sources }
    }

    pub fn locate(&self, headers: &HeaderMap, uri: &Uri) -> Option<(TokenSource, Credential)> {
        self.sources.iter().find_map(|source| {
            let raw = source.find(headers, uri);
            (!raw.is_empty()).then(|| (*source, Credential::new(raw)))
        })
    }
}

/// Header value with a leading `Bearer ` (any case) removed.
fn from_header(headers: &HeaderMap, name: &str) -> String {
    let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
        return String::new();
    };
    strip_bearer(value).to_string()
}

pub fn strip_bearer(value: &str) -> &str {
    if value.len() <= BEARER_PREFIX.len() {
        return value;
    }
    match (value.get(..BEARER_PREFIX.len()), value.get(BEARER_PREFIX.len()..)) {
        (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => rest,
        _ => value,
    }
}

fn from_query(uri: &Uri) -> String {
    let query = uri.query().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == IAM)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

fn from_cookie(headers: &HeaderMap) -> String {
    CookieJar::from_headers(headers)
        .get(IAM)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_default()
}
