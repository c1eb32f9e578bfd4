//! Errors produced by the authentication pipeline.
//!
//! `Display` of every variant is the exact message sent back to the caller in
//! the failure envelope, so wording here is part of the external contract.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("jwtauth: no token found")]
    NoTokenFound,

    // The verify stage ran without the locate stage having stored a credential.
    #[error("Internal Server Error: token not found")]
    InternalTokenMissing,

    #[error("key is invalid")]
    InvalidKey,

    #[error("jwtauth: token is not valid: {0}")]
    TokenInvalid(String),

    #[error("unable to build {0} url")]
    ServiceUrl(&'static str),

    #[error("unable to fetch key from keys server: {0}")]
    KeyFetch(#[source] reqwest::Error),

    #[error("unable to retrieve key '{status}', status {}", .status.as_u16())]
    KeyRetrievalFailed { status: reqwest::StatusCode },

    #[error("unable to unmarshal result from keys server: {0}")]
    KeyDecode(#[source] serde_json::Error),

    #[error("unexpected response body from keys server: {0}")]
    UnexpectedKeyResponse(String),

    #[error("jwtauth: sub is wrong")]
    SubNotFound,

    #[error("jwtauth: sub doesn't match requested user")]
    SubInvalid,

    #[error(transparent)]
    UserIdNotNumeric(#[from] std::num::ParseIntError),

    #[error("{0}")]
    AccessFetch(#[source] reqwest::Error),

    #[error("unable to retrieve access data '{status}', status {}", .status.as_u16())]
    AccessRequestFailed { status: reqwest::StatusCode },

    #[error("unable to unmarshal result from authorization service: {0}")]
    AccessDecode(#[source] serde_json::Error),

    // Failure reported by the access service itself, surfaced verbatim.
    #[error("{0}")]
    AccessDenied(String),

    // Free-form rejection raised by a custom claims policy.
    #[error("{0}")]
    Policy(String),
}

impl AuthError {
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy(message.into())
    }

    /// HTTP status the edge should answer with.
    ///
    /// Only wiring faults are server errors; everything else is reported as
    /// an authentication failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalTokenMissing => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::TokenInvalid(e.to_string())
    }
}
