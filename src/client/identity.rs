use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    client::{
        mfa::MfaEvent,
        status::{FlowStatus, StatusCell},
    },
    config::Config,
};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct IdentityError {
    pub message: String,
}

impl IdentityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An authenticated session issued by the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
    fn wallet_address(&self) -> Option<String>;

    /// Set when the provider wants a second factor before granting access.
    fn requires_additional_auth(&self) -> bool;

    async fn logout(&self) -> Result<(), IdentityError>;
}

/// Email one-time-password login offered by the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn connect_with_email(&self, email: &str) -> Result<(), IdentityError>;
    async fn verify_one_time_password(&self, otp: &str) -> Result<Arc<dyn Session>, IdentityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    Email,
    Otp,
    LoggedIn,
}

pub const SEND_OTP_FAILED: &str = "Failed to send OTP";
pub const INVALID_OTP: &str = "Invalid OTP";

/// `email -> otp -> logged-in`. A failed step stays where it is.
pub struct LoginFlow {
    provider: Arc<dyn IdentityProvider>,
    step: LoginStep,
    session: Option<Arc<dyn Session>>,
    mfa_events: Option<mpsc::Sender<MfaEvent>>,
    status: StatusCell,
}

impl LoginFlow {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            step: LoginStep::Email,
            session: None,
            mfa_events: None,
            status: StatusCell::new(),
        }
    }

    /// Builds the provider for the configured identity environment.
    pub fn from_config<F>(config: &Config, connect: F) -> Result<Self, IdentityError>
    where
        F: FnOnce(&str) -> Result<Arc<dyn IdentityProvider>, IdentityError>,
    {
        let environment_id = config.get_identity_environment_id();
        info!(environment_id, "Connecting identity provider");
        Ok(Self::new(connect(environment_id)?))
    }

    /// Forward each completed login to an [`MfaWorkflow`](crate::client::mfa::MfaWorkflow)
    /// listening on the other end.
    pub fn with_mfa_events(mut self, sender: mpsc::Sender<MfaEvent>) -> Self {
        self.mfa_events = Some(sender);
        self
    }

    pub fn step(&self) -> LoginStep {
        self.step
    }

    pub fn status(&self) -> FlowStatus {
        self.status.get()
    }

    pub fn session(&self) -> Option<Arc<dyn Session>> {
        self.session.clone()
    }

    pub async fn submit_email(&mut self, email: &str) {
        if self.step != LoginStep::Email {
            return;
        }
        let pending = self.status.begin();

        match self.provider.connect_with_email(email).await {
            Ok(()) => {
                self.step = LoginStep::Otp;
                pending.finish(FlowStatus::Idle);
            }
            Err(e) => {
                warn!(error = %e, "connect_with_email failed");
                pending.finish(FlowStatus::Error(SEND_OTP_FAILED.to_string()));
            }
        }
    }

    pub async fn submit_otp(&mut self, otp: &str) {
        if self.step != LoginStep::Otp {
            return;
        }
        let pending = self.status.begin();

        match self.provider.verify_one_time_password(otp).await {
            Ok(session) => {
                info!(
                    wallet = ?session.wallet_address(),
                    requires_additional_auth = session.requires_additional_auth(),
                    "Logged in"
                );
                if let Some(sender) = &self.mfa_events {
                    for event in MfaEvent::from_session(session.as_ref()) {
                        if sender.send(event).await.is_err() {
                            warn!("MFA workflow stopped listening, login events dropped");
                            break;
                        }
                    }
                }
                self.session = Some(session);
                self.step = LoginStep::LoggedIn;
                pending.finish(FlowStatus::Idle);
            }
            Err(e) => {
                warn!(error = %e, "verify_one_time_password failed");
                pending.finish(FlowStatus::Error(INVALID_OTP.to_string()));
            }
        }
    }

    /// Ends the session and returns to the email step.
    pub async fn logout(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        if let Err(e) = session.logout().await {
            warn!(error = %e, "Provider logout failed, dropping session anyway");
        }
        self.step = LoginStep::Email;
        self.status.set(FlowStatus::Idle);
    }
}
