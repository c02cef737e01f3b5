use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use thiserror::Error;

use crate::types::{BackendKind, ChainDescriptor, TransactionRequest};

/// Provider code for a request the user dismissed in the wallet UI.
pub const CODE_USER_REJECTED: i64 = 4001;
/// Provider code for the provider having lost its connection entirely.
pub const CODE_PROVIDER_DISCONNECTED: i64 = 4900;
/// Provider code for a switch-chain request naming a chain the wallet
/// has never been told about.
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

/// Error reported by a wallet provider.
///
/// Providers attach a numeric code to most failures (EIP-1193 style); the
/// session and facade layers classify on the code first and fall back to
/// the message text for providers that only report strings.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// An error with no provider code, message text only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(CODE_USER_REJECTED)
            || self.message.to_lowercase().contains("user rejected")
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == Some(CODE_UNRECOGNIZED_CHAIN)
    }

    pub fn is_provider_unavailable(&self) -> bool {
        self.code == Some(CODE_PROVIDER_DISCONNECTED)
            || self.message.to_lowercase().contains("not installed")
    }
}

/// Lifecycle notification pushed by a wallet provider.
///
/// Backends deliver these over a channel owned by the composition root,
/// which forwards them into [`SessionManager::handle_event`].
///
/// [`SessionManager::handle_event`]: crate::session::SessionManager::handle_event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The exposed account list changed. An empty list means the wallet
    /// revoked access.
    AccountsChanged(Vec<Address>),
    /// The wallet moved to a different chain.
    ChainChanged(u64),
    /// The provider dropped the session on its own.
    Disconnected,
}

/// Abstraction over a wallet provider.
///
/// Two implementations exist in a deployed front-end: the browser-injected
/// wallet and the QR-paired remote signer. The SDK never talks to either
/// directly; everything goes through this trait so the session manager and
/// contract facade stay provider-agnostic.
///
/// Every method is a suspending request to an external process. A call may
/// park for as long as the wallet keeps its approval UI open; callers that
/// need to abandon a request drop the future.
#[async_trait]
pub trait WalletBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Ask the wallet to expose its accounts, prompting the user if needed.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Ask the wallet to move to `chain_id`. Remote backends cannot be
    /// driven programmatically and report an error here.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// Ask the wallet to register a chain it does not know yet.
    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError>;

    /// Read-only contract call. No side effects, no signature.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderError>;

    /// Submit a signed, state-changing transaction and return its hash as
    /// soon as the provider accepts it.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError>;

    /// Wait until the given transaction is confirmed on-chain.
    async fn confirm(&self, tx_hash: TxHash) -> Result<(), ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;
}
