use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    errors::AppError,
    metrics::{track_verification, VerificationOutcome},
    models::signature::VerificationResult,
    services::{
        request_validator::{validate_request, ValidationError},
        signature_service::SignatureService,
    },
};

/// `POST /verify-signature`
///
/// Validation failures answer 400 with `{error}`. A well-formed signature that
/// does not recover still answers 200, with `isValid: false`.
pub async fn verify_signature(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerificationResult>, AppError> {
    let Json(body) = payload.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "verify_signature: unreadable body");
        track_verification(VerificationOutcome::Rejected);
        ValidationError::MalformedBody(rejection.body_text())
    })?;

    let request = validate_request(&body).map_err(|e| {
        debug!(error = %e, field = ?e.field(), "verify_signature: validation failed");
        track_verification(VerificationOutcome::Rejected);
        e
    })?;

    let result = match SignatureService::recover_checksummed(&request.message, &request.signature) {
        Some(signer) => {
            info!(signer = %signer, message_len = request.message.len(), "Signature verified");
            track_verification(VerificationOutcome::Valid);
            VerificationResult::valid(signer, request.message)
        }
        None => {
            info!(message_len = request.message.len(), "Signature did not recover a signer");
            track_verification(VerificationOutcome::Invalid);
            VerificationResult::invalid(request.message)
        }
    };

    Ok(Json(result))
}
