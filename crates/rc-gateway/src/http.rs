use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use rc_core::domain::{
    ActionName, AuditEvent, BoxFuture, FileUpload, GatewayError, InitiateReceipt, NewRequest,
    RefereePortalView, RefereeToken, ReferenceBackend, ReferenceSubmission, Request, RequestId,
    SealReceipt, StaffProfile, Template, TransportError, UploadReceipt,
};

use crate::wire;

// ---------------------------------------------------------------------------
// HttpGateway — live transport posting {action, payload} envelopes
// ---------------------------------------------------------------------------

/// Posts every action to the single deployed endpoint. No retries and no
/// cancellation: a failed call surfaces its error and the user retries by
/// resubmitting.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    timeout_ms: u64,
}

impl HttpGateway {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
            timeout_ms,
        })
    }

    async fn send<P: Serialize>(
        &self,
        action: ActionName,
        payload: &P,
    ) -> Result<Vec<u8>, GatewayError> {
        let call_id = Uuid::new_v4();
        let bytes = wire::encode_call(action, payload)?;

        tracing::debug!(action = %action, call_id = %call_id, "dispatching backend action");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("X-Request-Id", call_id.to_string())
            .body(bytes)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(TransportError::Connection(e.to_string())))?;

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }
            .into());
        }

        Ok(body.to_vec())
    }

    fn classify(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.timeout_ms,
            }
            .into()
        } else {
            TransportError::Connection(err.to_string()).into()
        }
    }

    async fn dispatch<P: Serialize, T: DeserializeOwned>(
        &self,
        action: ActionName,
        payload: &P,
    ) -> Result<T, GatewayError> {
        let body = self.send(action, payload).await?;
        note_rejection(action, wire::decode_reply(&body))
    }

    async fn dispatch_ack<P: Serialize>(
        &self,
        action: ActionName,
        payload: &P,
    ) -> Result<(), GatewayError> {
        let body = self.send(action, payload).await?;
        note_rejection(action, wire::decode_ack(&body))
    }
}

fn note_rejection<T>(
    action: ActionName,
    result: Result<T, GatewayError>,
) -> Result<T, GatewayError> {
    if let Err(err) = &result {
        if err.is_rejection() {
            tracing::warn!(action = %action, error = %err, "backend rejected action");
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Reply wrappers for list-shaped actions
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct RequestsReply {
    requests: Vec<Request>,
}

#[derive(serde::Deserialize)]
struct AuditReply {
    events: Vec<AuditEvent>,
}

#[derive(serde::Deserialize)]
struct TemplatesReply {
    templates: Vec<Template>,
}

// ---------------------------------------------------------------------------
// ReferenceBackend implementation
// ---------------------------------------------------------------------------

impl ReferenceBackend for HttpGateway {
    fn initiate_request<'a>(
        &'a self,
        request: &'a NewRequest,
    ) -> BoxFuture<'a, Result<InitiateReceipt, GatewayError>> {
        Box::pin(async move { self.dispatch(ActionName::InitiateRequest, request).await })
    }

    fn get_my_requests<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Request>, GatewayError>> {
        Box::pin(async move {
            let reply: RequestsReply = self
                .dispatch(ActionName::GetMyRequests, &serde_json::json!({}))
                .await?;
            Ok(reply.requests)
        })
    }

    fn validate_referee_token<'a>(
        &'a self,
        token: &'a RefereeToken,
    ) -> BoxFuture<'a, Result<RefereePortalView, GatewayError>> {
        Box::pin(async move {
            self.dispatch(
                ActionName::ValidateRefereeToken,
                &serde_json::json!({"token": token.as_str()}),
            )
            .await
        })
    }

    fn authorize_consent<'a>(
        &'a self,
        token: &'a RefereeToken,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            self.dispatch_ack(
                ActionName::AuthorizeConsent,
                &serde_json::json!({"token": token.as_str()}),
            )
            .await
        })
    }

    fn submit_reference<'a>(
        &'a self,
        submission: &'a ReferenceSubmission,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move { self.dispatch_ack(ActionName::SubmitReference, submission).await })
    }

    fn upload_reference_file<'a>(
        &'a self,
        upload: &'a FileUpload,
    ) -> BoxFuture<'a, Result<UploadReceipt, GatewayError>> {
        Box::pin(async move { self.dispatch(ActionName::UploadReferenceFile, upload).await })
    }

    fn seal_request<'a>(
        &'a self,
        request_id: &'a RequestId,
    ) -> BoxFuture<'a, Result<SealReceipt, GatewayError>> {
        Box::pin(async move {
            self.dispatch(
                ActionName::SealRequest,
                &serde_json::json!({"requestId": request_id.as_str()}),
            )
            .await
        })
    }

    fn verify_staff<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<StaffProfile, GatewayError>> {
        Box::pin(async move {
            self.dispatch(
                ActionName::VerifyStaff,
                &serde_json::json!({"email": email}),
            )
            .await
        })
    }

    fn get_audit_trail<'a>(
        &'a self,
        request_id: &'a RequestId,
    ) -> BoxFuture<'a, Result<Vec<AuditEvent>, GatewayError>> {
        Box::pin(async move {
            let reply: AuditReply = self
                .dispatch(
                    ActionName::GetAuditTrail,
                    &serde_json::json!({"requestId": request_id.as_str()}),
                )
                .await?;
            Ok(reply.events)
        })
    }

    fn get_templates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Template>, GatewayError>> {
        Box::pin(async move {
            let reply: TemplatesReply = self
                .dispatch(ActionName::GetTemplates, &serde_json::json!({}))
                .await?;
            Ok(reply.templates)
        })
    }

    fn save_template<'a>(
        &'a self,
        template: &'a Template,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            self.dispatch_ack(
                ActionName::SaveTemplate,
                &serde_json::json!({"template": template}),
            )
            .await
        })
    }
}
