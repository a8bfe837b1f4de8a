use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;

use rc_core::domain::{
    AuditEvent, BoxFuture, FieldSpec, FieldType, FileUpload, GatewayError, InitiateReceipt,
    NewRequest, RefereePortalView, RefereeToken, ReferenceBackend, ReferenceSubmission, Request,
    RequestId, RequestStatus, SealReceipt, StaffProfile, StaffRole, SubmitMethod, Template,
    UploadReceipt,
};

// ---------------------------------------------------------------------------
// MockGateway — in-memory stand-in for the deployed backend
// ---------------------------------------------------------------------------

/// Implements the full gateway port against canned in-memory data, with an
/// optional random delay range to imitate network latency. Unknown tokens
/// and ids come back as rejections, exactly like the real backend.
pub struct MockGateway {
    state: Mutex<MockState>,
    delay_ms: Option<(u64, u64)>,
    upload_failure: Option<String>,
}

struct MockState {
    requests: Vec<Request>,
    templates: Vec<Template>,
    tokens: HashMap<String, RequestId>,
    audit: HashMap<String, Vec<AuditEvent>>,
    seq: u32,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                requests: Vec::new(),
                templates: Vec::new(),
                tokens: HashMap::new(),
                audit: HashMap::new(),
                seq: 0,
            }),
            delay_ms: None,
            upload_failure: None,
        }
    }

    /// One active template and one request awaiting consent, reachable via
    /// the token `tok-001`.
    pub fn with_sample_data() -> Self {
        let gateway = Self::new();
        {
            let mut state = gateway.lock_state();
            state.templates.push(sample_template());
            state.requests.push(Request {
                request_id: RequestId::new("req-001"),
                candidate_name: "Alex Mercer".to_owned(),
                candidate_email: "alex.mercer@example.com".to_owned(),
                referee_name: "Jane Doe".to_owned(),
                referee_email: "jane.doe@acme.example".to_owned(),
                status: RequestStatus::PendingConsent.as_str().to_owned(),
                archived: false,
                responses: None,
                ai_analysis: None,
                pdf_url: None,
            });
            state
                .tokens
                .insert("tok-001".to_owned(), RequestId::new("req-001"));
            state.seq = 1;
        }
        gateway
    }

    pub fn with_delay_range(mut self, lo: u64, hi: u64) -> Self {
        self.delay_ms = Some((lo, hi));
        self
    }

    /// Makes every upload fail with the given message; used to exercise the
    /// upload-then-submit chain's abort path.
    pub fn failing_uploads(mut self, message: impl Into<String>) -> Self {
        self.upload_failure = Some(message.into());
        self
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state mutex poisoned")
    }

    async fn pause(&self) {
        let Some((lo, hi)) = self.delay_ms else {
            return;
        };
        let ms = rand::rng().random_range(lo..=hi);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_template() -> Template {
    Template::new(
        "tpl-standard",
        "Standard employment reference",
        vec![
            FieldSpec::new("q_relationship", FieldType::Text, "Working relationship")
                .required()
                .half(),
            FieldSpec::new("q_duration", FieldType::Text, "How long did you work together?")
                .required()
                .half(),
            FieldSpec::new("q_performance", FieldType::Rating, "Overall performance").required(),
            FieldSpec::new("q_rehire", FieldType::Boolean, "Would you rehire them?").required(),
            FieldSpec::new("q_rehire_details", FieldType::Textarea, "Why not?").when(
                "q_rehire",
                serde_json::json!(false),
                true,
            ),
            FieldSpec::new("q_comments", FieldType::Textarea, "Anything else to add?"),
            FieldSpec::new("sig", FieldType::Signature, "Signature").required(),
        ],
    )
}

// ---------------------------------------------------------------------------
// State helpers
// ---------------------------------------------------------------------------

impl MockState {
    fn request_for_token(&self, token: &RefereeToken) -> Result<usize, GatewayError> {
        let request_id = self
            .tokens
            .get(token.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::rejected("Invalid or expired referee token"))?;
        self.index_of(&request_id)
    }

    fn index_of(&self, request_id: &RequestId) -> Result<usize, GatewayError> {
        self.requests
            .iter()
            .position(|r| &r.request_id == request_id)
            .ok_or_else(|| GatewayError::rejected(format!("Unknown request {request_id}")))
    }

    fn record(&mut self, request_id: &RequestId, actor: &str, action: &str, details: Option<String>) {
        self.audit
            .entry(request_id.as_str().to_owned())
            .or_default()
            .push(AuditEvent {
                timestamp: Utc::now(),
                actor: actor.to_owned(),
                action: action.to_owned(),
                details,
            });
    }
}

fn has_status(request: &Request, status: RequestStatus) -> bool {
    request.canonical_status() == Some(status)
}

// ---------------------------------------------------------------------------
// ReferenceBackend implementation
// ---------------------------------------------------------------------------

impl ReferenceBackend for MockGateway {
    fn initiate_request<'a>(
        &'a self,
        request: &'a NewRequest,
    ) -> BoxFuture<'a, Result<InitiateReceipt, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock_state();
            state.seq += 1;
            let request_id = RequestId::new(format!("req-{:03}", state.seq));
            let token = format!("tok-{:03}", state.seq);

            state.requests.push(Request {
                request_id: request_id.clone(),
                candidate_name: request.candidate_name.clone(),
                candidate_email: request.candidate_email.clone(),
                referee_name: request.referee_name.clone(),
                referee_email: request.referee_email.clone(),
                status: RequestStatus::PendingConsent.as_str().to_owned(),
                archived: false,
                responses: None,
                ai_analysis: None,
                pdf_url: None,
            });
            state.tokens.insert(token, request_id.clone());
            state.record(
                &request_id,
                "recruiter@agency.example",
                "INITIATE_REQUEST",
                Some(format!("template {}", request.template_id)),
            );

            Ok(InitiateReceipt { request_id })
        })
    }

    fn get_my_requests<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Request>, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            Ok(self.lock_state().requests.clone())
        })
    }

    fn validate_referee_token<'a>(
        &'a self,
        token: &'a RefereeToken,
    ) -> BoxFuture<'a, Result<RefereePortalView, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            let state = self.lock_state();
            let index = state.request_for_token(token)?;
            let request = &state.requests[index];
            let fields = state
                .templates
                .first()
                .map(|t| t.fields.clone())
                .unwrap_or_default();

            Ok(RefereePortalView {
                request_id: request.request_id.clone(),
                candidate_name: request.candidate_name.clone(),
                status: request.status.clone(),
                fields,
            })
        })
    }

    fn authorize_consent<'a>(
        &'a self,
        token: &'a RefereeToken,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock_state();
            let index = state.request_for_token(token)?;
            if !has_status(&state.requests[index], RequestStatus::PendingConsent) {
                return Err(GatewayError::rejected("Consent has already been recorded"));
            }
            state.requests[index].status = RequestStatus::ConsentGiven.as_str().to_owned();
            let request_id = state.requests[index].request_id.clone();
            let actor = state.requests[index].candidate_email.clone();
            state.record(&request_id, &actor, "AUTHORIZE_CONSENT", None);
            Ok(())
        })
    }

    fn submit_reference<'a>(
        &'a self,
        submission: &'a ReferenceSubmission,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock_state();
            let index = state.request_for_token(&submission.token)?;
            if !has_status(&state.requests[index], RequestStatus::ConsentGiven) {
                return Err(GatewayError::rejected(
                    "Reference is not awaiting submission",
                ));
            }

            let request_id = state.requests[index].request_id.clone();
            let actor = state.requests[index].referee_email.clone();
            match submission.method {
                SubmitMethod::Form => {
                    state.requests[index].responses = submission.responses.clone();
                    state.requests[index].status =
                        RequestStatus::Completed.as_str().to_owned();
                    state.record(&request_id, &actor, "SUBMIT_REFERENCE", None);
                }
                SubmitMethod::Upload => {
                    state.requests[index].status =
                        RequestStatus::Completed.as_str().to_owned();
                    state.record(
                        &request_id,
                        &actor,
                        "SUBMIT_REFERENCE",
                        submission.file_name.clone(),
                    );
                }
                SubmitMethod::Decline => {
                    state.requests[index].status =
                        RequestStatus::Declined.as_str().to_owned();
                    state.record(
                        &request_id,
                        &actor,
                        "DECLINE_REFERENCE",
                        submission.decline_reason.clone(),
                    );
                }
            }
            Ok(())
        })
    }

    fn upload_reference_file<'a>(
        &'a self,
        upload: &'a FileUpload,
    ) -> BoxFuture<'a, Result<UploadReceipt, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            if let Some(message) = &self.upload_failure {
                return Err(GatewayError::rejected(message.clone()));
            }
            let state = self.lock_state();
            state.request_for_token(&upload.token)?;
            Ok(UploadReceipt {
                file_url: format!("https://files.example/uploads/{}", upload.file_name),
                file_name: upload.file_name.clone(),
            })
        })
    }

    fn seal_request<'a>(
        &'a self,
        request_id: &'a RequestId,
    ) -> BoxFuture<'a, Result<SealReceipt, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock_state();
            let index = state.index_of(request_id)?;
            let sealable = has_status(&state.requests[index], RequestStatus::Completed)
                || has_status(&state.requests[index], RequestStatus::Analyzed);
            if !sealable {
                return Err(GatewayError::rejected(
                    "Only completed references can be sealed",
                ));
            }

            let pdf_url = format!("https://files.example/sealed/{request_id}.pdf");
            state.requests[index].status = RequestStatus::Sealed.as_str().to_owned();
            state.requests[index].pdf_url = Some(pdf_url.clone());
            state.record(
                request_id,
                "recruiter@agency.example",
                "SEAL_REQUEST",
                Some("PDF generated".to_owned()),
            );

            Ok(SealReceipt {
                pdf_url: Some(pdf_url),
            })
        })
    }

    fn verify_staff<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<StaffProfile, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            match email {
                "dana@agency.example" => Ok(StaffProfile {
                    email: email.to_owned(),
                    name: "Dana Whitfield".to_owned(),
                    role: StaffRole::Recruiter,
                }),
                "admin@agency.example" => Ok(StaffProfile {
                    email: email.to_owned(),
                    name: "Sam Okafor".to_owned(),
                    role: StaffRole::Admin,
                }),
                _ => Err(GatewayError::rejected("Staff member not found")),
            }
        })
    }

    fn get_audit_trail<'a>(
        &'a self,
        request_id: &'a RequestId,
    ) -> BoxFuture<'a, Result<Vec<AuditEvent>, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            let state = self.lock_state();
            state.index_of(request_id)?;
            Ok(state
                .audit
                .get(request_id.as_str())
                .cloned()
                .unwrap_or_default())
        })
    }

    fn get_templates<'a>(&'a self) -> BoxFuture<'a, Result<Vec<Template>, GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            Ok(self.lock_state().templates.clone())
        })
    }

    fn save_template<'a>(
        &'a self,
        template: &'a Template,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            self.pause().await;
            let mut state = self.lock_state();
            match state
                .templates
                .iter_mut()
                .find(|t| t.template_id == template.template_id)
            {
                Some(existing) => *existing = template.clone(),
                None => state.templates.push(template.clone()),
            }
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::domain::{FieldId, ResponseSet, ResponseValue};

    fn sample_token() -> RefereeToken {
        RefereeToken::new("tok-001")
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let mock = MockGateway::with_sample_data();
        let err = mock
            .validate_referee_token(&RefereeToken::new("tok-nope"))
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_consent_transitions_status() {
        let mock = MockGateway::with_sample_data();
        mock.authorize_consent(&sample_token()).await.unwrap();

        let requests = mock.get_my_requests().await.unwrap();
        assert_eq!(
            requests[0].canonical_status(),
            Some(RequestStatus::ConsentGiven)
        );

        // Consent is one-way: a second attempt is rejected.
        let err = mock.authorize_consent(&sample_token()).await.unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_submit_requires_consent() {
        let mock = MockGateway::with_sample_data();
        let submission =
            ReferenceSubmission::form(sample_token(), ResponseSet::new());
        let err = mock.submit_reference(&submission).await.unwrap_err();
        assert!(err.to_string().contains("not awaiting submission"));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let mock = MockGateway::with_sample_data();
        mock.authorize_consent(&sample_token()).await.unwrap();

        let mut responses = ResponseSet::new();
        responses.insert(FieldId::new("q_performance"), ResponseValue::Rating(5));
        mock.submit_reference(&ReferenceSubmission::form(sample_token(), responses))
            .await
            .unwrap();

        let receipt = mock.seal_request(&RequestId::new("req-001")).await.unwrap();
        assert!(receipt.pdf_url.as_deref().unwrap().ends_with("req-001.pdf"));

        let requests = mock.get_my_requests().await.unwrap();
        assert_eq!(requests[0].canonical_status(), Some(RequestStatus::Sealed));
        assert_eq!(requests[0].pdf_url, receipt.pdf_url);

        let trail = mock
            .get_audit_trail(&RequestId::new("req-001"))
            .await
            .unwrap();
        let actions: Vec<&str> = trail.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["AUTHORIZE_CONSENT", "SUBMIT_REFERENCE", "SEAL_REQUEST"]
        );
    }

    #[tokio::test]
    async fn test_seal_before_completion_rejected() {
        let mock = MockGateway::with_sample_data();
        let err = mock
            .seal_request(&RequestId::new("req-001"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Only completed"));
    }

    #[tokio::test]
    async fn test_decline_branches_the_lifecycle() {
        let mock = MockGateway::with_sample_data();
        mock.authorize_consent(&sample_token()).await.unwrap();
        mock.submit_reference(&ReferenceSubmission::decline(
            sample_token(),
            "conflict-of-interest",
            None,
        ))
        .await
        .unwrap();

        let requests = mock.get_my_requests().await.unwrap();
        assert_eq!(
            requests[0].canonical_status(),
            Some(RequestStatus::Declined)
        );
    }

    #[tokio::test]
    async fn test_initiate_allocates_fresh_ids() {
        let mock = MockGateway::with_sample_data();
        let receipt = mock
            .initiate_request(&NewRequest {
                candidate_name: "Robin Vale".to_owned(),
                candidate_email: "robin@example.com".to_owned(),
                referee_name: "Chris Park".to_owned(),
                referee_email: "chris@former.example".to_owned(),
                template_id: rc_core::domain::TemplateId::new("tpl-standard"),
            })
            .await
            .unwrap();

        assert_eq!(receipt.request_id.as_str(), "req-002");
        let requests = mock.get_my_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_failure_knob() {
        let mock = MockGateway::with_sample_data().failing_uploads("Drive quota exceeded");
        let err = mock
            .upload_reference_file(&FileUpload {
                token: sample_token(),
                file_name: "reference.pdf".to_owned(),
                content_type: "application/pdf".to_owned(),
                data_base64: "JVBERi0=".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Drive quota exceeded");
    }

    #[tokio::test]
    async fn test_save_template_upserts() {
        let mock = MockGateway::with_sample_data();
        let mut template = sample_template();
        template.name = "Updated reference".to_owned();
        mock.save_template(&template).await.unwrap();

        let templates = mock.get_templates().await.unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Updated reference");
    }
}
