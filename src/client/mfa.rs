use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    client::{
        identity::Session,
        status::{FlowStatus, StatusCell},
    },
    models::mfa::{MfaDevice, MfaEnrollment, MfaView},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MfaProviderError {
    pub message: String,
}

impl MfaProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type MfaResult<T> = Result<T, MfaProviderError>;

/// Second-factor operations of the identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MfaProvider: Send + Sync {
    async fn add_device(&self) -> MfaResult<MfaEnrollment>;
    async fn authenticate_device(&self, code: &str) -> MfaResult<()>;
    async fn get_user_devices(&self) -> MfaResult<Vec<MfaDevice>>;
    async fn get_recovery_codes(&self) -> MfaResult<Vec<String>>;
}

/// Everything that can move the workflow: user actions and provider syncs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfaEvent {
    /// Login completed; refresh the device list.
    LoggedIn,
    /// The provider decided MFA action is needed for this session.
    Sync { requires_additional_auth: bool },
    AddDevice,
    ContinueToOtp,
    OtpInput(String),
    SubmitOtp,
}

impl MfaEvent {
    /// What a completed login feeds the workflow: a device refresh, then the
    /// session's second-factor requirement.
    pub fn from_session(session: &dyn Session) -> [MfaEvent; 2] {
        [
            MfaEvent::LoggedIn,
            MfaEvent::Sync {
                requires_additional_auth: session.requires_additional_auth(),
            },
        ]
    }
}

/// View state machine gating access behind device enrollment and OTP.
///
/// ```text
/// devices --AddDevice--> qr-code --ContinueToOtp--> otp --SubmitOtp--> backup-codes
/// Sync(required, 0 devices)  -> qr-code
/// Sync(required, >0 devices) -> otp
/// Sync(not required)         -> backup-codes
/// ```
///
/// Provider failures land in the status as the current error and leave the
/// view where it was.
pub struct MfaWorkflow {
    provider: Arc<dyn MfaProvider>,
    view: MfaView,
    devices: Vec<MfaDevice>,
    enrollment: Option<MfaEnrollment>,
    backup_codes: Vec<String>,
    otp_code: String,
    /// The OTP was accepted but fetching codes or devices afterwards failed.
    device_verified: bool,
    status: StatusCell,
}

impl MfaWorkflow {
    pub fn new(provider: Arc<dyn MfaProvider>) -> Self {
        Self {
            provider,
            view: MfaView::Devices,
            devices: Vec::new(),
            enrollment: None,
            backup_codes: Vec::new(),
            otp_code: String::new(),
            device_verified: false,
            status: StatusCell::new(),
        }
    }

    pub fn view(&self) -> MfaView {
        self.view
    }

    pub fn devices(&self) -> &[MfaDevice] {
        &self.devices
    }

    /// Provisioning URI and secret while the QR code is on screen.
    pub fn enrollment(&self) -> Option<&MfaEnrollment> {
        self.enrollment.as_ref()
    }

    pub fn backup_codes(&self) -> &[String] {
        &self.backup_codes
    }

    pub fn otp_code(&self) -> &str {
        &self.otp_code
    }

    pub fn status(&self) -> FlowStatus {
        self.status.get()
    }

    pub fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    /// Processes events in arrival order until every sender is dropped.
    pub async fn run(&mut self, mut events: mpsc::Receiver<MfaEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        debug!("MFA event channel closed");
    }

    /// Applies one event. Returns the view entered, if the event caused a
    /// transition.
    pub async fn handle(&mut self, event: MfaEvent) -> Option<MfaView> {
        debug!(view = %self.view, event = ?event, "MfaWorkflow::handle");

        match &event {
            MfaEvent::OtpInput(code) => {
                self.otp_code = code.clone();
                return None;
            }
            MfaEvent::ContinueToOtp => {
                return (self.view == MfaView::QrCode).then(|| self.enter(MfaView::Otp));
            }
            MfaEvent::AddDevice if self.view != MfaView::Devices => return None,
            MfaEvent::SubmitOtp if self.view != MfaView::Otp => return None,
            _ => {}
        }

        let pending = self.status.begin();
        let outcome = match event {
            MfaEvent::LoggedIn => self.refresh_devices().await,
            MfaEvent::Sync {
                requires_additional_auth,
            } => self.sync(requires_additional_auth).await,
            MfaEvent::AddDevice => self.begin_enrollment().await,
            MfaEvent::SubmitOtp => self.verify_otp().await,
            MfaEvent::OtpInput(_) | MfaEvent::ContinueToOtp => return None,
        };

        match outcome {
            Ok(next) => {
                pending.finish(FlowStatus::Idle);
                next.map(|view| self.enter(view))
            }
            Err(e) => {
                warn!(view = %self.view, error = %e, "MFA provider call failed");
                pending.finish(FlowStatus::Error(e.message));
                None
            }
        }
    }

    fn enter(&mut self, view: MfaView) -> MfaView {
        info!(from = %self.view, to = %view, "MFA view transition");
        self.view = view;
        view
    }

    async fn refresh_devices(&mut self) -> MfaResult<Option<MfaView>> {
        self.devices = self.provider.get_user_devices().await?;
        Ok(None)
    }

    async fn sync(&mut self, requires_additional_auth: bool) -> MfaResult<Option<MfaView>> {
        self.device_verified = false;
        if !requires_additional_auth {
            self.backup_codes = self.provider.get_recovery_codes().await?;
            return Ok(Some(MfaView::BackupCodes));
        }

        let devices = self.provider.get_user_devices().await?;
        let has_device = !devices.is_empty();
        self.devices = devices;

        if has_device {
            return Ok(Some(MfaView::Otp));
        }
        self.begin_enrollment().await
    }

    async fn begin_enrollment(&mut self) -> MfaResult<Option<MfaView>> {
        self.device_verified = false;
        self.enrollment = Some(self.provider.add_device().await?);
        Ok(Some(MfaView::QrCode))
    }

    async fn verify_otp(&mut self) -> MfaResult<Option<MfaView>> {
        if !self.device_verified {
            let code = std::mem::take(&mut self.otp_code);
            self.provider.authenticate_device(&code).await?;
            // Device is verified; the provisioning secret is no longer needed.
            self.device_verified = true;
            self.enrollment = None;
        }

        self.backup_codes = self.provider.get_recovery_codes().await?;
        self.devices = self.provider.get_user_devices().await?;
        self.device_verified = false;
        Ok(Some(MfaView::BackupCodes))
    }
}
