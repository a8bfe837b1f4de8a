use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::domain::{
    AuditEvent, FileUpload, GatewayError, InitiateReceipt, NewRequest, RefereePortalView,
    RefereeToken, ReferenceSubmission, Request, RequestId, SealReceipt, StaffProfile, Template,
    UploadReceipt,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ---------------------------------------------------------------------------
// ReferenceBackend — the remote action gateway port (object-safe async)
// ---------------------------------------------------------------------------

/// One method per backend action, with typed request and reply records.
/// Implementations: the HTTP transport and the in-memory mock. Calls are
/// independent; nothing here retries, reorders, or cancels.
pub trait ReferenceBackend: Send + Sync {
    fn initiate_request<'a>(
        &'a self,
        request: &'a NewRequest,
    ) -> BoxFuture<'a, Result<InitiateReceipt, GatewayError>>;

    fn get_my_requests<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Request>, GatewayError>>;

    fn validate_referee_token<'a>(
        &'a self,
        token: &'a RefereeToken,
    ) -> BoxFuture<'a, Result<RefereePortalView, GatewayError>>;

    fn authorize_consent<'a>(
        &'a self,
        token: &'a RefereeToken,
    ) -> BoxFuture<'a, Result<(), GatewayError>>;

    fn submit_reference<'a>(
        &'a self,
        submission: &'a ReferenceSubmission,
    ) -> BoxFuture<'a, Result<(), GatewayError>>;

    fn upload_reference_file<'a>(
        &'a self,
        upload: &'a FileUpload,
    ) -> BoxFuture<'a, Result<UploadReceipt, GatewayError>>;

    fn seal_request<'a>(
        &'a self,
        request_id: &'a RequestId,
    ) -> BoxFuture<'a, Result<SealReceipt, GatewayError>>;

    fn verify_staff<'a>(&'a self, email: &'a str)
        -> BoxFuture<'a, Result<StaffProfile, GatewayError>>;

    fn get_audit_trail<'a>(
        &'a self,
        request_id: &'a RequestId,
    ) -> BoxFuture<'a, Result<Vec<AuditEvent>, GatewayError>>;

    fn get_templates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Template>, GatewayError>>;

    fn save_template<'a>(
        &'a self,
        template: &'a Template,
    ) -> BoxFuture<'a, Result<(), GatewayError>>;
}

// ---------------------------------------------------------------------------
// Clock — injectable time source for deterministic testing
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used outside tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
