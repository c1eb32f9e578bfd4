/*
 * Responsibility
 * - JSON envelope shared by every response body
 *   {"data": ..., "message": "...", "status": "success" | "fail" | "error"}
 * - fail: client side (4xx), error: server side (5xx)
 */
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub message: String,
    pub status: EnvelopeStatus,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: String::new(),
            status: EnvelopeStatus::Success,
        }
    }
}

impl Envelope<()> {
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            status: EnvelopeStatus::Fail,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            status: EnvelopeStatus::Error,
        }
    }
}
