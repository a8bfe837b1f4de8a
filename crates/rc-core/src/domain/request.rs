use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RequestId, RequestStatus, ResponseSet};

// ---------------------------------------------------------------------------
// Request — read-only external entity owned by the backend
// ---------------------------------------------------------------------------

/// A reference request as the backend reports it. The status is kept as the
/// raw wire string (the backend emits mixed casings and may emit values this
/// client has never heard of); `canonical_status` normalizes on read.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub request_id: RequestId,
    pub candidate_name: String,
    pub candidate_email: String,
    pub referee_name: String,
    pub referee_email: String,
    pub status: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<ResponseSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl Request {
    pub fn canonical_status(&self) -> Option<RequestStatus> {
        RequestStatus::parse(&self.status)
    }
}

// ---------------------------------------------------------------------------
// AuditEvent — one row of a request's audit trail
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
