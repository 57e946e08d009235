//! Relay entry and the structured multi-tenant ingestion record.

use serde::{Deserialize, Serialize};

use crate::Result;

/// One decoded `(identifier, payload)` pair ready for the relay store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Mailbox the payload is addressed to.
    pub identifier: String,
    /// Free text, stored verbatim.
    pub payload: String,
}

impl Entry {
    /// Build an entry from any string-like parts.
    #[must_use]
    pub fn new(identifier: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            payload: payload.into(),
        }
    }
}

/// Multi-tenant wire record: `{"identifier": "...", "message": "..."}`.
///
/// Older producers send the identifier as `oasis_id`; both spellings are
/// accepted. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct FeedFrame {
    /// Target mailbox.
    #[serde(alias = "oasis_id")]
    pub identifier: String,
    /// Payload text.
    pub message: String,
}

impl FeedFrame {
    /// Parse a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` when `text` is not JSON or lacks a
    /// string `identifier` or `message`.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<FeedFrame> for Entry {
    fn from(frame: FeedFrame) -> Self {
        Self {
            identifier: frame.identifier,
            payload: frame.message,
        }
    }
}
