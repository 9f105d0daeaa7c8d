use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    models::signature::{ErrorResponse, VerificationRequest, VerificationResult},
    utils::eth_address_validator::is_valid_eth_address,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(StatusCode),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// What the verification endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResponse {
    /// A verification result, valid or not.
    Verified(VerificationResult),
    /// The request failed validation; carries the endpoint's error text.
    Rejected(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationApi: Send + Sync {
    async fn verify(&self, request: &VerificationRequest) -> ClientResult<VerificationResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpVerificationClient {
    client: Client,
    verify_url: String,
}

impl HttpVerificationClient {
    pub fn new(verify_url: String, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, verify_url })
    }

    fn check_result(result: VerificationResult) -> ClientResult<VerificationResult> {
        if result.is_valid {
            match result.signer.as_deref() {
                Some(signer) if is_valid_eth_address(signer) => {}
                other => {
                    return Err(ClientError::InvalidResponse(format!(
                        "valid result with bad signer {:?}",
                        other
                    )))
                }
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl VerificationApi for HttpVerificationClient {
    async fn verify(&self, request: &VerificationRequest) -> ClientResult<VerificationResponse> {
        let response = self.client.post(&self.verify_url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "HttpVerificationClient::verify");

        if status.is_server_error() {
            warn!(status = %status, "Verification endpoint failed");
            return Err(ClientError::Status(status));
        }

        // Some deployments answer an unrecoverable signature with 400 and a
        // full result body, so the body shape decides, not the status.
        if let Ok(result) = serde_json::from_str::<VerificationResult>(&body) {
            return Ok(VerificationResponse::Verified(Self::check_result(result)?));
        }

        if status.is_client_error() {
            let error = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            return Ok(VerificationResponse::Rejected(error));
        }

        Err(ClientError::InvalidResponse(format!(
            "unrecognised body with status {}",
            status
        )))
    }
}
