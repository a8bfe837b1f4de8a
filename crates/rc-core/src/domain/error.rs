use crate::domain::FieldId;

// ---------------------------------------------------------------------------
// Sub-error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("duplicate field id {id}")]
    DuplicateFieldId { id: FieldId },
    #[error("field {id} has an empty label")]
    EmptyLabel { id: FieldId },
    #[error("field {id} is conditional on unknown field {target}")]
    UnknownConditionalTarget { id: FieldId, target: FieldId },
    #[error("field {id} is conditional on itself")]
    SelfConditional { id: FieldId },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("backend connection failed: {0}")]
    Connection(String),
    #[error("backend returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("backend call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("backend returned a non-JSON body: {0}")]
    InvalidJson(String),
}

// ---------------------------------------------------------------------------
// Top-level gateway error
// ---------------------------------------------------------------------------

/// Every failed backend call collapses into one of these three shapes:
/// the transport broke, the backend answered `success: false`, or the
/// envelope decoded but the payload had an unexpected shape.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{message}")]
    Rejected { message: String },
    #[error("failed to decode backend reply: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Logical failures carry the backend's message verbatim for display.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
