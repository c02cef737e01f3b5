use std::time::Duration;

use crate::types::{ChainDescriptor, ChainRequirement};

/// Chain the lottery contract is deployed on (Polygon mainnet).
pub const REQUIRED_CHAIN_ID: u64 = 137;

/// Smallest purchase the contract accepts.
pub const MIN_TICKETS_PER_PURCHASE: u32 = 1;
/// Largest purchase the contract accepts in one transaction.
pub const MAX_TICKETS_PER_PURCHASE: u32 = 20;

/// Fixed gas ceiling attached to purchase transactions.
pub const PURCHASE_GAS_CEILING: u64 = 300_000;

/// Number of prize pools in the deployed contract.
pub const POOL_COUNT: usize = 3;

/// How many winners the dashboard asks for.
pub const RECENT_WINNERS_LIMIT: usize = 5;

/// How many purchase receipts the session keeps.
pub const RECEIPT_HISTORY: usize = 5;

/// Cadence of the dashboard poll while a session is active.
pub const REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Descriptor handed to the wallet when it does not know the required
/// chain yet.
pub fn polygon_mainnet() -> ChainDescriptor {
    ChainDescriptor {
        chain_id: REQUIRED_CHAIN_ID,
        name: "Polygon Mainnet".to_owned(),
        rpc_urls: vec!["https://polygon-rpc.com".to_owned()],
        currency_symbol: "MATIC".to_owned(),
        currency_decimals: 18,
        explorer_url: Some("https://polygonscan.com".to_owned()),
    }
}

pub fn required_chain() -> ChainRequirement {
    ChainRequirement {
        chain_id: REQUIRED_CHAIN_ID,
        descriptor: polygon_mainnet(),
    }
}
