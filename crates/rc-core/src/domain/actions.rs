use serde::{Deserialize, Serialize};

use crate::domain::{FieldSpec, RefereeToken, RequestId, ResponseSet, TemplateId};

// ---------------------------------------------------------------------------
// ActionName — the closed set of backend actions
// ---------------------------------------------------------------------------

/// Every backend function this client may invoke. The wire carries these as
/// camelCase name strings inside `{action, payload}` envelopes; keeping the
/// set closed turns a typo into a compile error instead of a runtime 404.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionName {
    InitiateRequest,
    GetMyRequests,
    ValidateRefereeToken,
    AuthorizeConsent,
    SubmitReference,
    UploadReferenceFile,
    SealRequest,
    VerifyStaff,
    GetAuditTrail,
    GetTemplates,
    SaveTemplate,
}

impl ActionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::InitiateRequest => "initiateRequest",
            ActionName::GetMyRequests => "getMyRequests",
            ActionName::ValidateRefereeToken => "validateRefereeToken",
            ActionName::AuthorizeConsent => "authorizeConsent",
            ActionName::SubmitReference => "submitReference",
            ActionName::UploadReferenceFile => "uploadReferenceFile",
            ActionName::SealRequest => "sealRequest",
            ActionName::VerifyStaff => "verifyStaff",
            ActionName::GetAuditTrail => "getAuditTrail",
            ActionName::GetTemplates => "getTemplates",
            ActionName::SaveTemplate => "saveTemplate",
        }
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub candidate_name: String,
    pub candidate_email: String,
    pub referee_name: String,
    pub referee_email: String,
    pub template_id: TemplateId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitMethod {
    Form,
    Upload,
    Decline,
}

/// Payload of `submitReference`. Only the optionals matching `method` are
/// populated; the constructors below keep the combinations well-formed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSubmission {
    pub token: RefereeToken,
    pub method: SubmitMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<ResponseSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ReferenceSubmission {
    pub fn form(token: RefereeToken, responses: ResponseSet) -> Self {
        Self {
            token,
            method: SubmitMethod::Form,
            responses: Some(responses),
            decline_reason: None,
            decline_details: None,
            uploaded_file_url: None,
            file_name: None,
        }
    }

    pub fn upload(token: RefereeToken, file_url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            token,
            method: SubmitMethod::Upload,
            responses: None,
            decline_reason: None,
            decline_details: None,
            uploaded_file_url: Some(file_url.into()),
            file_name: Some(file_name.into()),
        }
    }

    pub fn decline(token: RefereeToken, reason: impl Into<String>, details: Option<String>) -> Self {
        Self {
            token,
            method: SubmitMethod::Decline,
            responses: None,
            decline_reason: Some(reason.into()),
            decline_details: details,
            uploaded_file_url: None,
            file_name: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    pub token: RefereeToken,
    pub file_name: String,
    pub content_type: String,
    /// File content, base64-encoded for the JSON envelope.
    pub data_base64: String,
}

// ---------------------------------------------------------------------------
// Reply payloads
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateReceipt {
    pub request_id: RequestId,
}

/// What `validateRefereeToken` hands the referee portal: enough context to
/// render the form, nothing more.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefereePortalView {
    pub request_id: RequestId,
    pub candidate_name: String,
    pub status: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub file_url: String,
    pub file_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Recruiter,
    Admin,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub email: String,
    pub name: String,
    pub role: StaffRole,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
