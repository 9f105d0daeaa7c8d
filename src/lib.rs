//! # Message Verifier
//!
//! Recovers the signer of EIP-191 personal messages behind a small HTTP API,
//! and provides the client workflow that gets a wallet signature, submits it
//! for verification and keeps a persisted history of attempts.

pub mod args;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use http_server::{create_router, start_server, AppState, HttpServerError};
pub use models::signature::{VerificationRequest, VerificationResult};
pub use services::{
    request_validator::{validate_request, ValidationError},
    signature_service::{SignatureError, SignatureService},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

pub fn version() -> &'static str {
    VERSION
}

pub fn name() -> &'static str {
    NAME
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) -> AppResult<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = match level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!("Invalid log level: {}, defaulting to info", level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("message_verifier={},tower_http={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(name(), "message-verifier");
    }
}
