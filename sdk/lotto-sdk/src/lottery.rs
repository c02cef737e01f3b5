use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::SolCall;

use crate::abi;
use crate::core::backend::WalletBackend;
use crate::core::constants::POOL_COUNT;
use crate::error::{LottoSdkError, Result};
use crate::types::{
    validate_ticket_count, PoolStatus, SystemSummary, TransactionRequest, WinnerEntry,
};

/// Typed read/write wrapper around the deployed lottery contract.
///
/// Stateless: marshals calls through the active [`WalletBackend`], decodes
/// the numeric results, and classifies failures. It performs no retries; a
/// failed call is reported once and the caller decides what to do next.
pub struct LotteryContract {
    address: Address,
    backend: Arc<dyn WalletBackend>,
}

impl LotteryContract {
    pub fn new(address: Address, backend: Arc<dyn WalletBackend>) -> Self {
        Self { address, backend }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Current price of one ticket, in minor units.
    pub async fn ticket_price(&self) -> Result<U256> {
        let ret = self.read(abi::ticketPriceCall {}).await?;
        Ok(ret.price)
    }

    pub async fn system_summary(&self) -> Result<SystemSummary> {
        let ret = self.read(abi::getSystemOverviewCall {}).await?;
        Ok(SystemSummary {
            total_tickets: as_u64(ret.totalTickets, "total ticket count")?,
            total_prize: ret.totalPrize,
            active_pools: as_u64(ret.activePools, "active pool count")?,
        })
    }

    /// Status of every pool, in pool order.
    pub async fn pools_status(&self) -> Result<Vec<PoolStatus>> {
        let ret = self.read(abi::getAllPoolsSimplifiedStatusCall {}).await?;
        let flat = ret.flat;
        let mut pools = Vec::with_capacity(POOL_COUNT);
        for i in 0..POOL_COUNT {
            pools.push(PoolStatus {
                round: as_u64(flat[i], "pool round")?,
                ticket_count: as_u64(flat[POOL_COUNT + i], "pool ticket count")?,
                prize: flat[2 * POOL_COUNT + i],
            });
        }
        Ok(pools)
    }

    /// Ticket counts `account` holds in the current round, one per pool.
    pub async fn user_tickets(&self, account: Address) -> Result<Vec<u64>> {
        let ret = self
            .read(abi::getUserCurrentTicketsCall { user: account })
            .await?;
        ret.counts
            .into_iter()
            .map(|count| as_u64(count, "user ticket count"))
            .collect()
    }

    /// Most recent winners, newest first, at most `limit` entries.
    pub async fn recent_winners(&self, limit: usize) -> Result<Vec<WinnerEntry>> {
        let ret = self
            .read(abi::getRecentWinnersCall {
                limit: U256::from(limit),
            })
            .await?;
        let mut winners = ret
            .winners
            .into_iter()
            .map(|w| {
                Ok(WinnerEntry {
                    winner: w.winner,
                    prize: w.prize,
                    pool_id: as_u64(w.poolId, "winner pool id")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        winners.truncate(limit);
        Ok(winners)
    }

    /// Submit a ticket purchase carrying `total` as attached value.
    ///
    /// The count is validated locally first; out-of-range purchases never
    /// reach the backend.
    pub async fn buy_tickets(
        &self,
        from: Address,
        ticket_count: u32,
        total: U256,
        gas_ceiling: u64,
    ) -> Result<Submission> {
        validate_ticket_count(ticket_count)?;
        let data = abi::buyTicketCall {
            count: U256::from(ticket_count),
        }
        .abi_encode();
        let request = TransactionRequest {
            from,
            to: self.address,
            value: total,
            data: data.into(),
            gas: Some(gas_ceiling),
        };
        let tx_hash = self
            .backend
            .send_transaction(request)
            .await
            .map_err(LottoSdkError::send_failure)?;
        Ok(Submission {
            tx_hash,
            backend: Arc::clone(&self.backend),
        })
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let data = self
            .backend
            .call(self.address, call.abi_encode().into())
            .await
            .map_err(LottoSdkError::read_failure)?;
        C::abi_decode_returns(&data, true)
            .map_err(|err| LottoSdkError::ContractCallFailed(err.to_string()))
    }
}

/// Handle for a submitted purchase transaction.
pub struct Submission {
    tx_hash: TxHash,
    backend: Arc<dyn WalletBackend>,
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

impl Submission {
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Wait for on-chain confirmation of the submitted transaction.
    pub async fn confirmed(self) -> Result<TxHash> {
        self.backend
            .confirm(self.tx_hash)
            .await
            .map_err(LottoSdkError::send_failure)?;
        Ok(self.tx_hash)
    }
}

fn as_u64(value: U256, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| LottoSdkError::ContractCallFailed(format!("{what} overflows u64")))
}
