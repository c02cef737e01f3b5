use thiserror::Error;

use crate::core::backend::ProviderError;

/// SDK-specific error types for lottery session and contract operations.
///
/// Backend and contract faults are classified into this taxonomy at the
/// session-manager / facade boundary; nothing below it leaks out untyped.
/// Every failure leaves the session in a well-defined state.
#[derive(Debug, Clone, Error)]
pub enum LottoSdkError {
    /// The user dismissed a wallet prompt.
    #[error("request rejected in the wallet")]
    UserRejected,

    /// The wallet provider is missing, locked, or unreachable.
    #[error("wallet backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The session sits on a chain the contract is not deployed on.
    #[error("connected to chain {actual} but chain {required} is required")]
    WrongChain { actual: u64, required: u64 },

    /// The wallet could not be moved to the required chain, even after an
    /// add-chain attempt.
    #[error("chain switch failed: {0}")]
    ChainSwitchUnsupported(String),

    /// The account cannot cover ticket price plus fees.
    #[error("insufficient funds for this purchase")]
    InsufficientFunds,

    /// Ticket count outside the range the contract accepts.
    #[error("ticket count {0} is outside the allowed range")]
    InvalidTicketCount(u32),

    /// A read-only contract call failed at the RPC layer.
    #[error("contract call failed: {0}")]
    ContractCallFailed(String),

    /// The provider could not estimate or pay for gas.
    #[error("transaction fee estimation failed")]
    GasEstimationFailed,

    /// A connect attempt is already waiting on the wallet.
    #[error("a connect attempt is already in progress")]
    ConnectInProgress,

    /// The connect attempt finished after a disconnect superseded it; its
    /// result was discarded.
    #[error("connect attempt superseded by disconnect")]
    StaleConnect,

    /// A ticket purchase is still outstanding.
    #[error("a ticket purchase is already outstanding")]
    PurchaseInFlight,

    /// Anything the classifier could not place.
    #[error("{0}")]
    Unknown(String),
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, LottoSdkError>;

impl LottoSdkError {
    /// Classify a provider failure raised while establishing a session.
    pub(crate) fn connect_failure(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            Self::UserRejected
        } else if err.is_provider_unavailable() {
            Self::BackendUnavailable(err.message)
        } else {
            Self::Unknown(err.message)
        }
    }

    /// Classify a provider failure raised by a read-only call.
    pub(crate) fn read_failure(err: ProviderError) -> Self {
        Self::ContractCallFailed(err.message)
    }

    /// Classify a provider failure raised by a state-changing submission.
    ///
    /// Providers differ in how they report these, so the match falls back
    /// to message text after the numeric code.
    pub(crate) fn send_failure(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            return Self::UserRejected;
        }
        let message = err.message.to_lowercase();
        if message.contains("insufficient funds") {
            Self::InsufficientFunds
        } else if message.contains("gas") {
            Self::GasEstimationFailed
        } else {
            Self::Unknown(err.message)
        }
    }
}
