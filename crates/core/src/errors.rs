use serde_json::Value;
use thiserror::Error;

use crate::domain::quote::QuoteId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("activity `{0}` is already part of the composition")]
    DuplicateActivity(String),
    #[error("activity `{0}` is not part of the composition")]
    UnknownActivity(String),
    #[error("quote {0:?} cannot be saved without a requester identity")]
    MissingRequester(QuoteId),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failure payload returned by a remote collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{service} request failed: {detail}")]
pub struct RemoteError {
    pub service: String,
    pub detail: String,
}

impl RemoteError {
    pub fn new(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { service: service.into(), detail: detail.into() }
    }

    /// Builds an error from a raw response body, pulling a human-readable
    /// message out of the usual JSON envelope fields when there is one.
    pub fn from_payload(service: impl Into<String>, payload: &str) -> Self {
        Self::new(service, extract_detail(payload))
    }
}

pub fn extract_detail(payload: &str) -> String {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return "no error detail provided".to_string();
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return trimmed.to_string();
    };

    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                return text.trim().to_string();
            }
            Some(Value::Object(nested)) => {
                if let Some(Value::String(text)) = nested.get("message") {
                    return text.trim().to_string();
                }
            }
            _ => {}
        }
    }

    trimmed.to_string()
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Message suitable for the notification surface.
    pub fn user_message(&self) -> String {
        match self {
            Self::Domain(_) => {
                "The request could not be processed. Check inputs and try again.".to_string()
            }
            Self::Remote(remote) => remote.detail.clone(),
            Self::Configuration(_) => "An unexpected internal error occurred.".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
