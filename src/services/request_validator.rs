use serde_json::Value;

use crate::models::signature::VerificationRequest;

/// 65 byte r||s||v signature, hex encoded.
const SIGNATURE_HEX_LEN: usize = 130;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("\"value\" must be of type object")]
    NotAnObject,
    #[error("\"{0}\" is required")]
    Required(&'static str),
    #[error("\"{0}\" must be a string")]
    NotAString(&'static str),
    #[error("\"{0}\" is not allowed to be empty")]
    Empty(&'static str),
    #[error("\"signature\" with value \"{0}\" fails to match the required pattern: /^0x[0-9a-fA-F]{{130}}$/")]
    PatternMismatch(String),
    #[error("{0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// Name of the offending field, when the failure is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Required(field)
            | ValidationError::NotAString(field)
            | ValidationError::Empty(field) => Some(field),
            ValidationError::PatternMismatch(_) => Some("signature"),
            ValidationError::NotAnObject | ValidationError::MalformedBody(_) => None,
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a raw `/verify-signature` body. Rules run in order and the first
/// failure is returned.
pub fn validate_request(body: &Value) -> ValidationResult<VerificationRequest> {
    let fields = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let message = required_string(fields.get("message"), "message")?;
    let signature = required_string(fields.get("signature"), "signature")?;

    if !is_signature_shape(signature) {
        return Err(ValidationError::PatternMismatch(signature.to_string()));
    }

    Ok(VerificationRequest {
        message: message.to_string(),
        signature: signature.to_string(),
    })
}

fn required_string<'a>(value: Option<&'a Value>, field: &'static str) -> ValidationResult<&'a str> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::Required(field)),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::Empty(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ValidationError::NotAString(field)),
    }
}

/// `0x` followed by exactly 130 hex digits of either case.
pub fn is_signature_shape(signature: &str) -> bool {
    let Some(digits) = signature.strip_prefix("0x") else {
        return false;
    };

    digits.len() == SIGNATURE_HEX_LEN && digits.chars().all(|c| c.is_ascii_hexdigit())
}
