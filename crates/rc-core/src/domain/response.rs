use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::FieldId;

// ---------------------------------------------------------------------------
// Signature sub-value
// ---------------------------------------------------------------------------

/// Two-part signature state: a typed name and a drawn-ink data URI.
///
/// `signed_at` is stamped once, at the first non-empty interaction with
/// either part, and never moves afterwards within the same session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureValue {
    #[serde(default)]
    pub typed_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_data_url: Option<String>,
}

impl SignatureValue {
    /// Both parts present: a non-blank typed name and non-empty ink.
    pub fn is_complete(&self) -> bool {
        !self.typed_name.trim().is_empty()
            && self.signature_data_url.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Whether any sub-part carries a non-empty value.
    pub fn has_content(&self) -> bool {
        !self.typed_name.is_empty()
            || self.signature_data_url.as_deref().is_some_and(|d| !d.is_empty())
    }
}

// ---------------------------------------------------------------------------
// ResponseValue — one referee answer, shape depends on the field type
// ---------------------------------------------------------------------------

/// Untagged on the wire: booleans, 1-5 integers, strings (text, email,
/// textarea, ISO dates), or the signature object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Bool(bool),
    Rating(u8),
    Text(String),
    Signature(SignatureValue),
}

impl ResponseValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_signature(&self) -> Option<&SignatureValue> {
        match self {
            Self::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    /// JSON-value comparison used by conditional activation. Signatures never
    /// act as a conditional trigger.
    pub fn matches_json(&self, expected: &serde_json::Value) -> bool {
        match (self, expected) {
            (Self::Bool(b), serde_json::Value::Bool(e)) => b == e,
            (Self::Rating(r), serde_json::Value::Number(n)) => n.as_u64() == Some(u64::from(*r)),
            (Self::Text(s), serde_json::Value::String(e)) => s == e,
            _ => false,
        }
    }
}

/// Referee answers keyed by field id.
pub type ResponseSet = HashMap<FieldId, ResponseValue>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
