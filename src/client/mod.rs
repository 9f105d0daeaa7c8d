//! Client side of the signing workflow: login, MFA gating, wallet signing,
//! verification calls and the persisted history.

pub mod history;
pub mod identity;
pub mod mfa;
pub mod signing;
pub mod status;
pub mod storage;
pub mod verification_client;
pub mod wallet;

pub use history::HistoryStore;
pub use identity::{IdentityProvider, LoginFlow, Session};
pub use mfa::{MfaEvent, MfaProvider, MfaProviderError, MfaWorkflow};
pub use signing::{SigningClient, SigningError};
pub use status::FlowStatus;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use verification_client::{HttpVerificationClient, VerificationApi, VerificationResponse};
pub use wallet::{LocalWallet, WalletProvider};
