use serde::{Deserialize, Serialize};

use crate::models::signature::VerificationResult;

/// One completed signing attempt as kept in the client history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub message: String,
    pub signature: String,
    pub is_valid: bool,
    pub signer: Option<String>,
}

impl HistoryEntry {
    pub fn new(message: String, signature: String, result: &VerificationResult) -> Self {
        Self {
            message,
            signature,
            is_valid: result.is_valid,
            signer: result.signer.clone(),
        }
    }
}
