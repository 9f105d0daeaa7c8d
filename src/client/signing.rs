use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    client::{
        history::HistoryStore,
        status::{FlowStatus, StatusCell},
        verification_client::{ClientError, VerificationApi, VerificationResponse},
        wallet::{WalletError, WalletProvider},
    },
    models::{
        history::HistoryEntry,
        signature::{VerificationRequest, VerificationResult},
    },
};

pub const SIGNING_FAILED: &str = "Signing failed";

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
    #[error("Wallet returned an empty signature")]
    EmptySignature,
    #[error("Verification request failed: {0}")]
    Transport(#[from] ClientError),
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl SigningError {
    /// Text safe to show the user. Only validation feedback from the endpoint
    /// is passed through.
    pub fn user_message(&self) -> String {
        match self {
            SigningError::Rejected(message) => message.clone(),
            _ => SIGNING_FAILED.to_string(),
        }
    }
}

/// Drives "wallet signs, endpoint verifies, history records".
pub struct SigningClient {
    wallet: Arc<dyn WalletProvider>,
    api: Arc<dyn VerificationApi>,
    history: HistoryStore,
    message_input: String,
    last_result: Option<VerificationResult>,
    status: StatusCell,
}

impl SigningClient {
    pub fn new(wallet: Arc<dyn WalletProvider>, api: Arc<dyn VerificationApi>, history: HistoryStore) -> Self {
        Self {
            wallet,
            api,
            history,
            message_input: String::new(),
            last_result: None,
            status: StatusCell::new(),
        }
    }

    pub fn wallet_address(&self) -> String {
        self.wallet.address()
    }

    pub fn message_input(&self) -> &str {
        &self.message_input
    }

    pub fn set_message_input(&mut self, message: impl Into<String>) {
        self.message_input = message.into();
    }

    pub fn last_result(&self) -> Option<&VerificationResult> {
        self.last_result.as_ref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn status(&self) -> FlowStatus {
        self.status.get()
    }

    pub fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    /// Sign the current message input. See [`SigningClient::sign`].
    pub async fn sign_input(&mut self) {
        let message = self.message_input.clone();
        self.sign(&message).await;
    }

    /// Sign `message`, verify it and record the outcome. Errors end up in
    /// [`SigningClient::status`]; nothing is returned to the caller.
    ///
    /// A history entry is written only when the endpoint produced a
    /// verification result, valid or not.
    pub async fn sign(&mut self, message: &str) {
        // `&mut self` rules out overlap; the guard only covers an abandoned call.
        let pending = self.status.begin();

        match self.sign_and_verify(message).await {
            Ok((signature, result)) => {
                let entry = HistoryEntry::new(message.to_string(), signature, &result);
                if let Err(e) = self.history.append(entry) {
                    error!(error = %e, "Failed to persist history entry");
                }
                info!(is_valid = result.is_valid, signer = ?result.signer, "Signing attempt completed");

                self.last_result = Some(result);
                self.message_input.clear();
                pending.finish(FlowStatus::Idle);
            }
            Err(e) => {
                warn!(error = %e, "Signing attempt failed");
                pending.finish(FlowStatus::Error(e.user_message()));
            }
        }
    }

    async fn sign_and_verify(&self, message: &str) -> Result<(String, VerificationResult), SigningError> {
        let signature = self
            .wallet
            .sign_message(message)
            .await?
            .filter(|s| !s.is_empty())
            .ok_or(SigningError::EmptySignature)?;

        let request = VerificationRequest {
            message: message.to_string(),
            signature: signature.clone(),
        };

        match self.api.verify(&request).await? {
            VerificationResponse::Verified(result) => Ok((signature, result)),
            VerificationResponse::Rejected(error) => Err(SigningError::Rejected(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        storage::MemoryStore,
        verification_client::MockVerificationApi,
        wallet::{LocalWallet, MockWalletProvider},
    };
    use crate::services::signature_service::SignatureService;

    /// Verifies locally with the same recovery the endpoint performs.
    struct InProcessApi;

    #[async_trait::async_trait]
    impl VerificationApi for InProcessApi {
        async fn verify(&self, request: &VerificationRequest) -> Result<VerificationResponse, ClientError> {
            let result = match SignatureService::recover_checksummed(&request.message, &request.signature) {
                Some(signer) => VerificationResult::valid(signer, request.message.clone()),
                None => VerificationResult::invalid(request.message.clone()),
            };
            Ok(VerificationResponse::Verified(result))
        }
    }

    /// Never answers its first signing request, then signs normally.
    struct StallOnceWallet {
        inner: LocalWallet,
        stalled: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl WalletProvider for StallOnceWallet {
        fn address(&self) -> String {
            self.inner.address()
        }

        async fn sign_message(&self, message: &str) -> Result<Option<String>, WalletError> {
            if !self.stalled.swap(true, std::sync::atomic::Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            self.inner.sign_message(message).await
        }
    }

    fn history() -> HistoryStore {
        HistoryStore::open(Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn successful_sign_records_history_and_clears_input() {
        let wallet = Arc::new(LocalWallet::random());
        let mut client = SigningClient::new(wallet.clone(), Arc::new(InProcessApi), history());
        client.set_message_input("Hello Web3!");

        client.sign_input().await;

        assert_eq!(client.status(), FlowStatus::Idle);
        assert_eq!(client.message_input(), "");
        let result = client.last_result().unwrap();
        assert!(result.is_valid);
        assert_eq!(result.signer.as_deref(), Some(wallet.address().as_str()));

        assert_eq!(client.history().len(), 1);
        let entry = &client.history()[0];
        assert_eq!(entry.message, "Hello Web3!");
        assert!(entry.is_valid);
        assert_eq!(entry.signer, result.signer);
    }

    #[tokio::test]
    async fn invalid_result_is_still_recorded() {
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_sign_message()
            .times(1)
            .returning(|_| Ok(Some(format!("0x{}", "0".repeat(130)))));

        let mut client = SigningClient::new(Arc::new(wallet), Arc::new(InProcessApi), history());
        client.sign("Hello").await;

        assert_eq!(client.status(), FlowStatus::Idle);
        assert_eq!(client.history().len(), 1);
        assert!(!client.history()[0].is_valid);
        assert_eq!(client.history()[0].signer, None);
    }

    #[tokio::test]
    async fn wallet_rejection_surfaces_generic_error_without_history() {
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_sign_message()
            .returning(|_| Err(WalletError::Rejected("user cancelled".to_string())));
        let mut api = MockVerificationApi::new();
        api.expect_verify().times(0);

        let mut client = SigningClient::new(Arc::new(wallet), Arc::new(api), history());
        client.set_message_input("keep me");
        client.sign("keep me").await;

        assert_eq!(client.status(), FlowStatus::Error(SIGNING_FAILED.to_string()));
        assert!(client.history().is_empty());
        assert_eq!(client.message_input(), "keep me");
        assert!(client.last_result().is_none());
    }

    #[tokio::test]
    async fn empty_signature_never_reaches_endpoint() {
        let mut wallet = MockWalletProvider::new();
        wallet.expect_sign_message().returning(|_| Ok(Some(String::new())));
        let mut api = MockVerificationApi::new();
        api.expect_verify().times(0);

        let mut client = SigningClient::new(Arc::new(wallet), Arc::new(api), history());
        client.sign("Hello").await;

        assert_eq!(client.status(), FlowStatus::Error(SIGNING_FAILED.to_string()));
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_produces_no_history() {
        let mut api = MockVerificationApi::new();
        api.expect_verify().times(1).returning(|_| {
            Err(ClientError::Status(reqwest::StatusCode::BAD_GATEWAY))
        });

        let mut client = SigningClient::new(Arc::new(LocalWallet::random()), Arc::new(api), history());
        client.sign("Hello").await;

        assert_eq!(client.status().error(), Some(SIGNING_FAILED));
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn rejection_shows_endpoint_message_without_history() {
        let mut api = MockVerificationApi::new();
        api.expect_verify()
            .withf(|request| request.message == "Hello")
            .returning(|_| Ok(VerificationResponse::Rejected("\"signature\" is required".to_string())));

        let mut client = SigningClient::new(Arc::new(LocalWallet::random()), Arc::new(api), history());
        client.sign("Hello").await;

        assert_eq!(client.status().error(), Some("\"signature\" is required"));
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn signs_against_running_server() {
        use crate::client::verification_client::HttpVerificationClient;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = crate::http_server::create_router(crate::utils::test_app_state::create_test_app_state());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let api = HttpVerificationClient::new(
            format!("http://{}/verify-signature", address),
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        let wallet = Arc::new(LocalWallet::random());
        let store = Arc::new(MemoryStore::new());
        let mut client = SigningClient::new(
            wallet.clone(),
            Arc::new(api),
            HistoryStore::open(store.clone()).unwrap(),
        );

        client.sign("Hello Web3!").await;

        assert_eq!(client.status(), FlowStatus::Idle);
        let result = client.last_result().unwrap();
        assert!(result.is_valid);
        assert_eq!(result.signer.as_deref(), Some(wallet.address().as_str()));

        let reloaded = HistoryStore::open(store).unwrap();
        assert_eq!(reloaded.entries(), client.history());
    }

    #[tokio::test]
    async fn abandoned_sign_does_not_block_the_next_one() {
        let wallet = Arc::new(StallOnceWallet {
            inner: LocalWallet::random(),
            stalled: std::sync::atomic::AtomicBool::new(false),
        });
        let mut client = SigningClient::new(wallet, Arc::new(InProcessApi), history());

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(50), client.sign("abandoned")).await;
        assert!(abandoned.is_err());
        assert_eq!(client.status(), FlowStatus::Idle);
        assert!(client.history().is_empty());

        client.sign("second").await;
        assert_eq!(client.status(), FlowStatus::Idle);
        assert_eq!(client.history().len(), 1);
        assert_eq!(client.history()[0].message, "second");
        assert!(client.history()[0].is_valid);
    }

    #[tokio::test]
    async fn error_clears_on_next_success() {
        let mut api = MockVerificationApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_verify()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ClientError::InvalidResponse("garbage".to_string())));
        api.expect_verify()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|request| {
                Ok(VerificationResponse::Verified(VerificationResult::invalid(
                    request.message.clone(),
                )))
            });

        let mut client = SigningClient::new(Arc::new(LocalWallet::random()), Arc::new(api), history());
        client.sign("first").await;
        assert!(client.status().error().is_some());

        client.sign("second").await;
        assert_eq!(client.status(), FlowStatus::Idle);
        assert_eq!(client.history().len(), 1);
        assert_eq!(client.history()[0].message, "second");
    }
}
