use rc_core::domain::{
    FileUpload, GatewayError, RefereeToken, ReferenceBackend, ReferenceSubmission, UploadReceipt,
};

// ---------------------------------------------------------------------------
// submit_with_upload — the two-step upload-then-submit chain
// ---------------------------------------------------------------------------

/// Uploads the referee's document, then submits a reference pointing at the
/// stored file. Strictly sequential: if the upload fails, the submit is
/// never issued and the caller sees only the upload's error.
pub async fn submit_with_upload(
    backend: &dyn ReferenceBackend,
    token: &RefereeToken,
    file_name: &str,
    content_type: &str,
    data_base64: String,
) -> Result<UploadReceipt, GatewayError> {
    let upload = FileUpload {
        token: token.clone(),
        file_name: file_name.to_owned(),
        content_type: content_type.to_owned(),
        data_base64,
    };
    let receipt = backend.upload_reference_file(&upload).await?;

    let submission = ReferenceSubmission::upload(
        token.clone(),
        receipt.file_url.clone(),
        receipt.file_name.clone(),
    );
    backend.submit_reference(&submission).await?;

    Ok(receipt)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
