use std::collections::VecDeque;
use std::time::SystemTime;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::core::constants::{
    MAX_TICKETS_PER_PURCHASE, MIN_TICKETS_PER_PURCHASE, RECEIPT_HISTORY,
};
use crate::error::{LottoSdkError, Result};

/// Which wallet provider a session runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Browser-injected extension wallet.
    Local,
    /// QR-paired remote signer.
    Remote,
}

/// Lifecycle state of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    /// An account is attached but the wallet sits on the wrong chain.
    ChainMismatch,
}

/// Point-in-time view of the session, as handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub backend: Option<BackendKind>,
}

impl SessionSnapshot {
    pub fn disconnected() -> Self {
        Self {
            status: SessionStatus::Disconnected,
            account: None,
            chain_id: None,
            backend: None,
        }
    }

    /// True while an account is attached (connected or chain-mismatched).
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Connected | SessionStatus::ChainMismatch
        )
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Network descriptor submitted with an add-chain request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub name: String,
    pub rpc_urls: Vec<String>,
    pub currency_symbol: String,
    pub currency_decimals: u8,
    pub explorer_url: Option<String>,
}

/// The single chain the application insists on, plus the descriptor used
/// when the wallet has to be taught about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRequirement {
    pub chain_id: u64,
    pub descriptor: ChainDescriptor,
}

/// State-changing transaction handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    /// Attached value in minor units.
    pub value: U256,
    pub data: Bytes,
    pub gas: Option<u64>,
}

/// Check a ticket count against the range the contract accepts.
pub fn validate_ticket_count(ticket_count: u32) -> Result<()> {
    if (MIN_TICKETS_PER_PURCHASE..=MAX_TICKETS_PER_PURCHASE).contains(&ticket_count) {
        Ok(())
    } else {
        Err(LottoSdkError::InvalidTicketCount(ticket_count))
    }
}

/// Price quote for a prospective purchase.
///
/// Recomputed whenever the ticket count or unit price changes. The total is
/// always the exact 256-bit integer product; currency never touches a float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketQuote {
    pub unit_price: U256,
    pub ticket_count: u32,
    pub total: U256,
}

impl TicketQuote {
    pub fn new(unit_price: U256, ticket_count: u32) -> Result<Self> {
        validate_ticket_count(ticket_count)?;
        let total = unit_price
            .checked_mul(U256::from(ticket_count))
            .ok_or_else(|| LottoSdkError::Unknown("purchase total overflows 256 bits".into()))?;
        Ok(Self {
            unit_price,
            ticket_count,
            total,
        })
    }
}

/// Record of a submitted (not necessarily confirmed) ticket purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub tx_hash: TxHash,
    pub ticket_count: u32,
    pub total: U256,
    pub submitted_at: SystemTime,
}

/// Bounded, newest-first log of purchase receipts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptLog {
    entries: VecDeque<PurchaseReceipt>,
}

impl ReceiptLog {
    pub fn record(&mut self, receipt: PurchaseReceipt) {
        self.entries.push_front(receipt);
        self.entries.truncate(RECEIPT_HISTORY);
    }

    pub fn newest_first(&self) -> Vec<PurchaseReceipt> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Aggregate counters reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSummary {
    pub total_tickets: u64,
    pub total_prize: U256,
    pub active_pools: u64,
}

/// One prize pool as reported by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub round: u64,
    pub ticket_count: u64,
    pub prize: U256,
}

/// One past draw winner, most recent first in any sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub winner: Address,
    pub prize: U256,
    pub pool_id: u64,
}

/// Everything the periodic refresh collects for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub ticket_price: U256,
    pub summary: SystemSummary,
    pub pools: Vec<PoolStatus>,
    /// Ticket counts held by the active account, one entry per pool.
    pub user_tickets: Vec<u64>,
    pub winners: Vec<WinnerEntry>,
}

impl Dashboard {
    /// False when there is no winner history yet; the UI renders an
    /// explicit empty state in that case instead of a blank list.
    pub fn has_winners(&self) -> bool {
        !self.winners.is_empty()
    }
}
