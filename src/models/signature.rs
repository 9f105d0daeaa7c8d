use serde::{Deserialize, Serialize};

/// A request that passed validation and is ready for signer recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub message: String,
    pub signature: String,
}

/// Outcome of a verification call. Produced once per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_valid: bool,
    pub signer: Option<String>,
    pub original_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn valid(signer: String, message: String) -> Self {
        Self {
            is_valid: true,
            signer: Some(signer),
            original_message: message,
            error: None,
        }
    }

    pub fn invalid(message: String) -> Self {
        Self {
            is_valid: false,
            signer: None,
            original_message: message,
            error: Some(INVALID_SIGNATURE.to_string()),
        }
    }
}

pub const INVALID_SIGNATURE: &str = "Invalid signature";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_result_serializes_null_signer_and_error() {
        let value = serde_json::to_value(VerificationResult::invalid("Hello".to_string())).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "isValid": false,
                "signer": null,
                "originalMessage": "Hello",
                "error": "Invalid signature"
            })
        );
    }

    #[test]
    fn valid_result_omits_error_field() {
        let value = serde_json::to_value(VerificationResult::valid(
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".to_string(),
            "Hello".to_string(),
        ))
        .unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["isValid"], true);
    }
}
