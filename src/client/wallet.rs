use alloy::signers::{local::PrivateKeySigner, Signer};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Signing request rejected: {0}")]
    Rejected(String),
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// The connected wallet. Signing may wait on the user approving the request
/// in the wallet's own UI.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn address(&self) -> String;

    /// Hex signature of `message`, or `None` when the wallet produced nothing.
    async fn sign_message(&self, message: &str) -> Result<Option<String>, WalletError>;
}

/// Wallet backed by an in-process secp256k1 key.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let signer = private_key_hex
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self { signer })
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    fn address(&self) -> String {
        self.signer.address().to_checksum(None)
    }

    async fn sign_message(&self, message: &str) -> Result<Option<String>, WalletError> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| WalletError::Rejected(e.to_string()))?;
        Ok(Some(format!("0x{}", hex::encode(signature.as_bytes()))))
    }
}
