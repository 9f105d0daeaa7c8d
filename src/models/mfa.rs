use serde::{Deserialize, Serialize};

/// Device record as returned by the MFA provider. Only the count matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MfaDevice(pub serde_json::Value);

/// Provisioning data shown while a new authenticator is being configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfaEnrollment {
    pub uri: String,
    pub secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MfaView {
    Devices,
    QrCode,
    Otp,
    BackupCodes,
}

impl std::fmt::Display for MfaView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MfaView::Devices => write!(f, "devices"),
            MfaView::QrCode => write!(f, "qr-code"),
            MfaView::Otp => write!(f, "otp"),
            MfaView::BackupCodes => write!(f, "backup-codes"),
        }
    }
}

impl std::str::FromStr for MfaView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "devices" => Ok(MfaView::Devices),
            "qr-code" => Ok(MfaView::QrCode),
            "otp" => Ok(MfaView::Otp),
            "backup-codes" => Ok(MfaView::BackupCodes),
            _ => Err(format!("Invalid MFA view: {}", s)),
        }
    }
}
