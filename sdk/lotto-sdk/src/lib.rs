//! Client SDK for the pooled ticket lottery DApp.
//!
//! # Overview
//!
//! Two pieces make up the crate. [`SessionManager`] owns the wallet
//! connection lifecycle: one account, one of two provider backends, a small
//! set of observable states, and deterministic reactions to the events the
//! provider pushes. [`LotteryContract`] is a typed facade over the deployed
//! contract: price and pool reads, winner history, and value-carrying ticket
//! purchases.
//!
//! Wallet providers are reached exclusively through the [`WalletBackend`]
//! trait, so the same session logic drives the browser-injected wallet and
//! the QR-paired remote signer. See `./tests` for usage against a scripted
//! backend.

pub mod abi;
pub mod core;
pub mod error;
pub mod lottery;
pub mod session;
pub mod types;
pub mod utils;

pub use crate::core::backend::{ProviderError, ProviderEvent, WalletBackend};
pub use crate::error::{LottoSdkError, Result};
pub use crate::lottery::{LotteryContract, Submission};
pub use crate::session::{PurchaseHandle, SessionManager};
pub use crate::types::{
    BackendKind, ChainDescriptor, ChainRequirement, Dashboard, PoolStatus, PurchaseReceipt,
    ReceiptLog, SessionSnapshot, SessionStatus, SystemSummary, TicketQuote, TransactionRequest,
    WinnerEntry,
};
