use alloy::primitives::{Address, Signature};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Signature must be 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Signature recovery failed: {0}")]
    Recovery(#[from] alloy::primitives::SignatureError),
}

pub type SignatureResult<T> = Result<T, SignatureError>;

/// Recovers signers of EIP-191 personal messages.
pub struct SignatureService;

impl SignatureService {
    /// Recover the address whose key produced `signature_hex` over `message`.
    ///
    /// The message is hashed as `"\x19Ethereum Signed Message:\n" + len + message`
    /// before secp256k1 public key recovery, which is what wallets do for
    /// `personal_sign`.
    pub fn recover_signer(message: &str, signature_hex: &str) -> SignatureResult<Address> {
        let sig_hex = signature_hex.strip_prefix("0x").unwrap_or(signature_hex);
        let sig_bytes = hex::decode(sig_hex)?;
        if sig_bytes.len() != 65 {
            return Err(SignatureError::InvalidLength(sig_bytes.len()));
        }

        let signature = Signature::from_raw(&sig_bytes)?;
        let signer = signature.recover_address_from_msg(message.as_bytes())?;
        debug!(
            message_len = message.len(),
            signer = %signer,
            "SignatureService::recover_signer"
        );
        Ok(signer)
    }

    /// Like [`SignatureService::recover_signer`], rendering the address with
    /// its EIP-55 checksum. Failures are logged and collapsed to `None`.
    pub fn recover_checksummed(message: &str, signature_hex: &str) -> Option<String> {
        match Self::recover_signer(message, signature_hex) {
            Ok(address) => Some(address.to_checksum(None)),
            Err(e) => {
                warn!(error = %e, "SignatureService::recover_checksummed: recovery failed");
                None
            }
        }
    }
}
