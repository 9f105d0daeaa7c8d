pub mod request_validator;
pub mod signature_service;
