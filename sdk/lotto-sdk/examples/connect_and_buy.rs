// Example: full session walkthrough against a canned in-process wallet.
//
// This example demonstrates how to:
// 1. Connect a wallet session and verify the required chain
// 2. Quote and submit a ticket purchase
// 3. Read the dashboard data the UI renders

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use lotto_sdk::abi;
use lotto_sdk::core::backend::{ProviderError, WalletBackend};
use lotto_sdk::core::constants;
use lotto_sdk::types::{BackendKind, ChainDescriptor, TransactionRequest};
use lotto_sdk::utils::{format_units, short_address};
use lotto_sdk::{LotteryContract, SessionManager};

/// Wallet stand-in with one account on Polygon and fixed contract answers.
struct CannedWallet {
    account: Address,
}

#[async_trait]
impl WalletBackend for CannedWallet {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(vec![self.account])
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(constants::REQUIRED_CHAIN_ID)
    }

    async fn switch_chain(&self, _chain_id: u64) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn add_chain(&self, _chain: &ChainDescriptor) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ProviderError::message("malformed calldata"))?;
        let ret = if selector == abi::ticketPriceCall::SELECTOR {
            abi::ticketPriceCall::abi_encode_returns(&(U256::from(
                2_000_000_000_000_000_000u64,
            ),))
        } else if selector == abi::getSystemOverviewCall::SELECTOR {
            abi::getSystemOverviewCall::abi_encode_returns(&(
                U256::from(128u64),
                U256::from(77_000_000_000_000_000_000u128),
                U256::from(3u64),
            ))
        } else if selector == abi::getAllPoolsSimplifiedStatusCall::SELECTOR {
            abi::getAllPoolsSimplifiedStatusCall::abi_encode_returns(&([
                U256::from(4u64),
                U256::from(4u64),
                U256::from(2u64),
                U256::from(50u64),
                U256::from(61u64),
                U256::from(17u64),
                U256::from(10_000_000_000_000_000_000u128),
                U256::from(25_000_000_000_000_000_000u128),
                U256::from(42_000_000_000_000_000_000u128),
            ],))
        } else if selector == abi::getUserCurrentTicketsCall::SELECTOR {
            abi::getUserCurrentTicketsCall::abi_encode_returns(&([
                U256::from(2u64),
                U256::ZERO,
                U256::from(1u64),
            ],))
        } else if selector == abi::getRecentWinnersCall::SELECTOR {
            abi::getRecentWinnersCall::abi_encode_returns(&(vec![abi::Winner {
                winner: Address::repeat_byte(0x77),
                prize: U256::from(12_000_000_000_000_000_000u128),
                poolId: U256::from(2u64),
            }],))
        } else {
            return Err(ProviderError::message("unexpected call"));
        };
        Ok(ret.into())
    }

    async fn send_transaction(&self, _tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        Ok(TxHash::repeat_byte(0x42))
    }

    async fn confirm(&self, _tx_hash: TxHash) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manager = Arc::new(SessionManager::default());
    let backend = Arc::new(CannedWallet {
        account: Address::repeat_byte(0x11),
    });

    // 1. Connect and make sure we sit on the required chain
    let snapshot = manager.connect(backend.clone()).await?;
    println!(
        "connected as {} on chain {}",
        short_address(&snapshot.account.expect("connected session has an account")),
        snapshot.chain_id.expect("connected session has a chain"),
    );
    manager.ensure_required_chain().await?;

    // 2. Quote and buy three tickets
    let contract = LotteryContract::new(Address::repeat_byte(0x22), backend.clone());
    let price = contract.ticket_price().await?;
    let quote = manager.quote(price, 3)?;
    println!(
        "3 tickets at {} MATIC each = {} MATIC",
        format_units(quote.unit_price, 18),
        format_units(quote.total, 18),
    );

    let handle = manager.purchase_tickets(&contract, 3).await?;
    println!("submitted purchase {}", handle.tx_hash());
    let receipt = handle.confirmed().await?;
    println!("confirmed purchase of {} tickets", receipt.ticket_count);

    // 3. Read what the dashboard would render
    let summary = contract.system_summary().await?;
    println!(
        "{} tickets sold, {} MATIC in prizes across {} pools",
        summary.total_tickets,
        format_units(summary.total_prize, 18),
        summary.active_pools,
    );
    for (i, pool) in contract.pools_status().await?.iter().enumerate() {
        println!(
            "  pool {}: round {}, {} tickets, {} MATIC",
            i + 1,
            pool.round,
            pool.ticket_count,
            format_units(pool.prize, 18),
        );
    }
    for winner in contract.recent_winners(5).await? {
        println!(
            "  winner {} took {} MATIC from pool {}",
            short_address(&winner.winner),
            format_units(winner.prize, 18),
            winner.pool_id,
        );
    }

    manager.disconnect().await;
    Ok(())
}
