use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use anyhow::bail;
use async_trait::async_trait;
use tokio::sync::Notify;

use lotto_sdk::abi;
use lotto_sdk::core::backend::{ProviderError, WalletBackend};
use lotto_sdk::session::SessionManager;
use lotto_sdk::types::{BackendKind, ChainDescriptor, SessionStatus, TransactionRequest};

pub fn test_account() -> Address {
    Address::repeat_byte(0x11)
}

pub fn contract_address() -> Address {
    Address::repeat_byte(0x22)
}

/// Scripted wallet provider.
///
/// Plays both backend roles for the session and facade tests: canned
/// accounts and chain, per-selector call responses, queued switch-chain
/// outcomes, and a gate that holds `request_accounts` open so tests can
/// disconnect mid-connect deterministically. Counters record how often the
/// session actually touched the provider.
pub struct MockBackend {
    kind: BackendKind,
    state: Mutex<MockState>,
    gate: Notify,
    pub reads: AtomicUsize,
    pub sends: AtomicUsize,
    pub disconnects: AtomicUsize,
}

#[derive(Default)]
struct MockState {
    accounts: Vec<Address>,
    chain_id: u64,
    gated: bool,
    connect_error: Option<ProviderError>,
    call_responses: HashMap<[u8; 4], Result<Vec<u8>, ProviderError>>,
    send_error: Option<ProviderError>,
    confirm_error: Option<ProviderError>,
    switch_results: VecDeque<Result<(), ProviderError>>,
    add_chain_error: Option<ProviderError>,
    switch_calls: usize,
    add_chain_calls: usize,
    sent: Vec<TransactionRequest>,
}

impl MockBackend {
    pub fn new(kind: BackendKind, account: Address, chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            kind,
            state: Mutex::new(MockState {
                accounts: vec![account],
                chain_id,
                ..MockState::default()
            }),
            gate: Notify::new(),
            reads: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        })
    }

    pub fn local(chain_id: u64) -> Arc<Self> {
        Self::new(BackendKind::Local, test_account(), chain_id)
    }

    pub fn remote(chain_id: u64) -> Arc<Self> {
        Self::new(BackendKind::Remote, test_account(), chain_id)
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.state.lock().unwrap().accounts = accounts;
    }

    /// Hold the next `request_accounts` open until [`release_connect`].
    ///
    /// [`release_connect`]: MockBackend::release_connect
    pub fn gate_connect(&self) {
        self.state.lock().unwrap().gated = true;
    }

    pub fn release_connect(&self) {
        self.gate.notify_one();
    }

    pub fn fail_connect(&self, err: ProviderError) {
        self.state.lock().unwrap().connect_error = Some(err);
    }

    pub fn respond<C: SolCall>(&self, return_data: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .call_responses
            .insert(C::SELECTOR, Ok(return_data));
    }

    pub fn fail_call<C: SolCall>(&self, err: ProviderError) {
        self.state
            .lock()
            .unwrap()
            .call_responses
            .insert(C::SELECTOR, Err(err));
    }

    pub fn fail_send(&self, err: ProviderError) {
        self.state.lock().unwrap().send_error = Some(err);
    }

    pub fn fail_confirm(&self, err: ProviderError) {
        self.state.lock().unwrap().confirm_error = Some(err);
    }

    pub fn push_switch_result(&self, result: Result<(), ProviderError>) {
        self.state.lock().unwrap().switch_results.push_back(result);
    }

    pub fn fail_add_chain(&self, err: ProviderError) {
        self.state.lock().unwrap().add_chain_error = Some(err);
    }

    pub fn switch_calls(&self) -> usize {
        self.state.lock().unwrap().switch_calls
    }

    pub fn add_chain_calls(&self) -> usize {
        self.state.lock().unwrap().add_chain_calls
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Total provider traffic, reads plus submissions.
    pub fn backend_traffic(&self) -> usize {
        self.reads.load(Ordering::SeqCst) + self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let gated = self.state.lock().unwrap().gated;
        if gated {
            self.gate.notified().await;
        }
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.connect_error.take() {
            return Err(err);
        }
        Ok(state.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.switch_calls += 1;
        match state.switch_results.pop_front() {
            Some(result) => {
                if result.is_ok() {
                    state.chain_id = chain_id;
                }
                result
            }
            None => {
                state.chain_id = chain_id;
                Ok(())
            }
        }
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.add_chain_calls += 1;
        match state.add_chain_error.take() {
            Some(err) => Err(err),
            None => {
                state.chain_id = chain.chain_id;
                Ok(())
            }
        }
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, ProviderError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ProviderError::message("calldata shorter than a selector"))?;
        let state = self.state.lock().unwrap();
        match state.call_responses.get(&selector) {
            Some(Ok(data)) => Ok(Bytes::from(data.clone())),
            Some(Err(err)) => Err(err.clone()),
            None => Err(ProviderError::message("no scripted response for call")),
        }
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        let n = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().unwrap();
        state.sent.push(tx);
        match state.send_error.take() {
            Some(err) => Err(err),
            None => Ok(TxHash::repeat_byte(n as u8)),
        }
    }

    async fn confirm(&self, _tx_hash: TxHash) -> Result<(), ProviderError> {
        match self.state.lock().unwrap().confirm_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

//=============================================================================
// Return-data encoders
//=============================================================================

pub fn encode_price(price: U256) -> Vec<u8> {
    abi::ticketPriceCall::abi_encode_returns(&(price,))
}

pub fn encode_overview(total_tickets: u64, total_prize: U256, active_pools: u64) -> Vec<u8> {
    abi::getSystemOverviewCall::abi_encode_returns(&(
        U256::from(total_tickets),
        total_prize,
        U256::from(active_pools),
    ))
}

pub fn encode_pools(flat: [u64; 9]) -> Vec<u8> {
    abi::getAllPoolsSimplifiedStatusCall::abi_encode_returns(&(flat.map(U256::from),))
}

pub fn encode_user_tickets(counts: [u64; 3]) -> Vec<u8> {
    abi::getUserCurrentTicketsCall::abi_encode_returns(&(counts.map(U256::from),))
}

pub fn encode_winners(winners: Vec<abi::Winner>) -> Vec<u8> {
    abi::getRecentWinnersCall::abi_encode_returns(&(winners,))
}

pub fn winner(address_byte: u8, prize: u64, pool_id: u64) -> abi::Winner {
    abi::Winner {
        winner: Address::repeat_byte(address_byte),
        prize: U256::from(prize),
        poolId: U256::from(pool_id),
    }
}

/// Script every dashboard read with plausible values.
pub fn stub_dashboard(backend: &MockBackend) {
    backend.respond::<abi::ticketPriceCall>(encode_price(U256::from(1_000_000_000_000_000_000u64)));
    backend.respond::<abi::getSystemOverviewCall>(encode_overview(
        42,
        U256::from(7_000_000_000_000_000_000u64),
        3,
    ));
    backend.respond::<abi::getAllPoolsSimplifiedStatusCall>(encode_pools([
        1, 2, 3, 10, 20, 30, 100, 200, 300,
    ]));
    backend.respond::<abi::getUserCurrentTicketsCall>(encode_user_tickets([4, 0, 1]));
    backend.respond::<abi::getRecentWinnersCall>(encode_winners(vec![
        winner(0xaa, 500, 1),
        winner(0xbb, 250, 2),
    ]));
}

//=============================================================================
// Polling helpers
//=============================================================================

pub async fn wait_for_status(
    manager: &SessionManager,
    status: SessionStatus,
) -> anyhow::Result<()> {
    for _ in 0..200 {
        if manager.snapshot().status == status {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    bail!("session never reached {status:?}")
}

pub async fn wait_until(what: &str, cond: impl Fn() -> bool) -> anyhow::Result<()> {
    for _ in 0..200 {
        if cond() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    bail!("timed out waiting for {what}")
}
