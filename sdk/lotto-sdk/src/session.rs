use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use alloy::primitives::{Address, TxHash, U256};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::core::backend::{ProviderEvent, WalletBackend};
use crate::core::constants::{self, PURCHASE_GAS_CEILING, RECENT_WINNERS_LIMIT};
use crate::error::{LottoSdkError, Result};
use crate::lottery::{LotteryContract, Submission};
use crate::types::{
    BackendKind, ChainRequirement, Dashboard, PurchaseReceipt, ReceiptLog, SessionSnapshot,
    SessionStatus, TicketQuote, validate_ticket_count,
};

/// Owns the one wallet session the application ever has.
///
/// The manager is created once at the composition root and shared by `Arc`;
/// every consumer reads through [`snapshot`] and mutates through the typed
/// operations. State transitions come from exactly two places, UI calls and
/// provider events, and both run one at a time: the internal lock is only
/// held for field updates and is never held across an await.
///
/// [`snapshot`]: SessionManager::snapshot
pub struct SessionManager {
    required: ChainRequirement,
    purchase_pending: Arc<AtomicBool>,
    inner: Mutex<Inner>,
}

struct Inner {
    session: SessionSnapshot,
    backend: Option<Arc<dyn WalletBackend>>,
    connecting: bool,
    /// Connect generation. Bumped on every reset so a connect that resolves
    /// after an intervening disconnect can tell it no longer owns the session.
    epoch: u64,
    last_error: Option<LottoSdkError>,
    last_quote: Option<TicketQuote>,
    receipts: ReceiptLog,
    refresh: Option<JoinHandle<()>>,
    pump: Option<JoinHandle<()>>,
}

impl SessionManager {
    pub fn new(required: ChainRequirement) -> Self {
        Self {
            required,
            purchase_pending: Arc::new(AtomicBool::new(false)),
            inner: Mutex::new(Inner {
                session: SessionSnapshot::disconnected(),
                backend: None,
                connecting: false,
                epoch: 0,
                last_error: None,
                last_quote: None,
                receipts: ReceiptLog::default(),
                refresh: None,
                pump: None,
            }),
        }
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required.chain_id
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().session.clone()
    }

    /// Purchase receipts, newest first, capped to the most recent five.
    pub fn receipts(&self) -> Vec<PurchaseReceipt> {
        self.lock().receipts.newest_first()
    }

    pub fn last_quote(&self) -> Option<TicketQuote> {
        self.lock().last_quote.clone()
    }

    pub fn last_error(&self) -> Option<LottoSdkError> {
        self.lock().last_error.clone()
    }

    /// Recompute the displayed quote for a new ticket count or unit price.
    pub fn quote(&self, unit_price: U256, ticket_count: u32) -> Result<TicketQuote> {
        let quote = TicketQuote::new(unit_price, ticket_count)?;
        self.lock().last_quote = Some(quote.clone());
        Ok(quote)
    }

    /// Establish a session on `backend`.
    ///
    /// Any previously active backend is torn down first. The wallet prompt
    /// may stay open indefinitely; the returned future can be dropped, or
    /// superseded by [`disconnect`], in which case a late approval is
    /// discarded and the session stays `Disconnected`.
    ///
    /// [`disconnect`]: SessionManager::disconnect
    pub async fn connect(&self, backend: Arc<dyn WalletBackend>) -> Result<SessionSnapshot> {
        let previous = {
            let mut inner = self.lock();
            if inner.connecting {
                return Err(LottoSdkError::ConnectInProgress);
            }
            Self::reset_locked(&mut inner)
        };
        if let Some(previous) = previous {
            info!(backend = ?previous.kind(), "tearing down previous backend before connect");
            if let Err(err) = previous.disconnect().await {
                warn!(error = %err, "previous backend teardown failed");
            }
        }

        let kind = backend.kind();
        let epoch = {
            let mut inner = self.lock();
            inner.connecting = true;
            inner.session.status = SessionStatus::Connecting;
            inner.session.backend = Some(kind);
            inner.epoch
        };

        info!(backend = ?kind, "requesting wallet accounts");
        let outcome = Self::negotiate(backend.as_ref()).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            // A disconnect landed while the wallet prompt was open; whatever
            // the wallet answered, this attempt no longer owns the session.
            debug!("discarding superseded connect result");
            return Err(LottoSdkError::StaleConnect);
        }
        inner.connecting = false;
        match outcome {
            Ok((account, chain_id)) => {
                inner.backend = Some(backend);
                inner.session.account = Some(account);
                inner.session.chain_id = Some(chain_id);
                inner.session.status = SessionStatus::Connected;
                Self::evaluate_chain_locked(&mut inner, self.required.chain_id);
                info!(account = %account, chain_id, "wallet session established");
                Ok(inner.session.clone())
            }
            Err(err) => {
                inner.session = SessionSnapshot::disconnected();
                inner.last_error = Some(err.clone());
                error!(error = %err, "wallet connect failed");
                Err(err)
            }
        }
    }

    async fn negotiate(backend: &dyn WalletBackend) -> Result<(Address, u64)> {
        let accounts = backend
            .request_accounts()
            .await
            .map_err(LottoSdkError::connect_failure)?;
        let account = accounts.first().copied().ok_or_else(|| {
            LottoSdkError::BackendUnavailable("wallet exposed no accounts".into())
        })?;
        let chain_id = backend
            .chain_id()
            .await
            .map_err(LottoSdkError::connect_failure)?;
        Ok((account, chain_id))
    }

    /// Bring the session onto the required chain.
    ///
    /// On the local backend this issues a switch-chain request, falling back
    /// to a single add-chain request when the wallet does not know the chain.
    /// The remote backend cannot be driven programmatically, so the user is
    /// asked to switch manually and `WrongChain` is returned.
    pub async fn ensure_required_chain(&self) -> Result<()> {
        let (backend, chain_id, epoch) = {
            let inner = self.lock();
            let backend = inner.backend.clone().ok_or_else(|| {
                LottoSdkError::BackendUnavailable("no active wallet session".into())
            })?;
            let chain_id = inner.session.chain_id.ok_or_else(|| {
                LottoSdkError::BackendUnavailable("session has no chain id".into())
            })?;
            (backend, chain_id, inner.epoch)
        };

        if chain_id == self.required.chain_id {
            let mut inner = self.lock();
            Self::evaluate_chain_locked(&mut inner, self.required.chain_id);
            return Ok(());
        }

        if backend.kind() == BackendKind::Remote {
            warn!(
                actual = chain_id,
                required = self.required.chain_id,
                "remote wallet is on the wrong chain; the user must switch networks in the wallet app"
            );
            return Err(self.fail(LottoSdkError::WrongChain {
                actual: chain_id,
                required: self.required.chain_id,
            }));
        }

        let result = match backend.switch_chain(self.required.chain_id).await {
            Err(err) if err.is_unrecognized_chain() => {
                // The wallet has never seen this chain; one add-chain attempt
                // with the fixed descriptor, then give up.
                info!(chain_id = self.required.chain_id, "wallet does not know the required chain; requesting add-chain");
                backend.add_chain(&self.required.descriptor).await
            }
            other => other,
        };

        match result {
            Ok(()) => {
                let mut inner = self.lock();
                if inner.epoch != epoch {
                    return Err(LottoSdkError::StaleConnect);
                }
                inner.session.chain_id = Some(self.required.chain_id);
                Self::evaluate_chain_locked(&mut inner, self.required.chain_id);
                Ok(())
            }
            Err(err) if err.is_user_rejection() => Err(self.fail(LottoSdkError::UserRejected)),
            Err(err) => Err(self.fail(LottoSdkError::ChainSwitchUnsupported(err.message))),
        }
    }

    /// Tear down the active session.
    ///
    /// Backend-level failures are logged and swallowed; the session always
    /// ends `Disconnected` with account and chain cleared.
    pub async fn disconnect(&self) {
        let backend = {
            let mut inner = self.lock();
            Self::reset_locked(&mut inner)
        };
        if let Some(backend) = backend {
            info!(backend = ?backend.kind(), "disconnecting wallet session");
            if let Err(err) = backend.disconnect().await {
                warn!(error = %err, "backend teardown failed; session reset anyway");
            }
        }
    }

    /// React to a provider lifecycle event.
    ///
    /// Reactions are deterministic and idempotent: replaying the same event
    /// leaves observable state unchanged after the first delivery. A chain
    /// change is handled as a soft re-sync, updating the recorded chain and
    /// re-evaluating the requirement in place.
    ///
    /// Must run inside the tokio runtime: teardown work is spawned, never
    /// awaited, so event handling itself cannot stall.
    pub fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                if accounts.is_empty() {
                    let backend = {
                        let mut inner = self.lock();
                        if inner.backend.is_none() {
                            return;
                        }
                        Self::reset_locked(&mut inner)
                    };
                    info!("wallet revoked account access; session closed");
                    if let Some(backend) = backend {
                        tokio::spawn(async move {
                            if let Err(err) = backend.disconnect().await {
                                warn!(error = %err, "backend teardown failed after account revocation");
                            }
                        });
                    }
                } else {
                    let mut inner = self.lock();
                    if inner.backend.is_none() {
                        return;
                    }
                    let account = accounts[0];
                    if inner.session.account != Some(account) {
                        info!(account = %account, "active account changed");
                        inner.session.account = Some(account);
                    }
                    Self::evaluate_chain_locked(&mut inner, self.required.chain_id);
                }
            }
            ProviderEvent::ChainChanged(chain_id) => {
                let mut inner = self.lock();
                if inner.backend.is_none() {
                    return;
                }
                if inner.session.chain_id != Some(chain_id) {
                    info!(chain_id, "provider moved to a different chain");
                    inner.session.chain_id = Some(chain_id);
                }
                Self::evaluate_chain_locked(&mut inner, self.required.chain_id);
            }
            ProviderEvent::Disconnected => {
                let had_session = {
                    let mut inner = self.lock();
                    if inner.backend.is_none() && !inner.connecting {
                        return;
                    }
                    Self::reset_locked(&mut inner).is_some()
                };
                if had_session {
                    info!("provider reported disconnect; session closed");
                }
            }
        }
    }

    /// Forward a backend's event stream into [`handle_event`] on a spawned
    /// task. The task ends with the stream and is aborted on disconnect.
    ///
    /// [`handle_event`]: SessionManager::handle_event
    pub fn pump_events(
        self: &Arc<Self>,
        mut events: mpsc::UnboundedReceiver<ProviderEvent>,
    ) {
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                manager.handle_event(event);
            }
        });
        let mut inner = self.lock();
        if let Some(old) = inner.pump.replace(handle) {
            old.abort();
        }
    }

    /// Start the periodic dashboard poll.
    ///
    /// Production front-ends pass [`constants::REFRESH_PERIOD`]; tests use
    /// shorter periods. The first tick fires immediately, then every
    /// `period`. The task emits
    /// a [`Dashboard`] per cycle while the session is active and is aborted
    /// the moment the session transitions to `Disconnected`. A failed cycle
    /// is reported once and the feed moves on to the next tick.
    pub fn start_refresh(
        self: &Arc<Self>,
        contract: Arc<LotteryContract>,
        period: Duration,
    ) -> mpsc::UnboundedReceiver<Dashboard> {
        let (tx, rx) = mpsc::unbounded_channel();
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let snapshot = manager.snapshot();
                let account = match (snapshot.is_active(), snapshot.account) {
                    (true, Some(account)) => account,
                    _ => break,
                };
                debug!("dashboard refresh tick");
                match Self::collect_dashboard(&contract, account).await {
                    Ok(dashboard) => {
                        if tx.send(dashboard).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(error = %err, "dashboard refresh failed"),
                }
            }
        });
        let mut inner = self.lock();
        if let Some(old) = inner.refresh.replace(handle) {
            old.abort();
        }
        rx
    }

    async fn collect_dashboard(
        contract: &LotteryContract,
        account: Address,
    ) -> Result<Dashboard> {
        let ticket_price = contract.ticket_price().await?;
        let summary = contract.system_summary().await?;
        let pools = contract.pools_status().await?;
        let user_tickets = contract.user_tickets(account).await?;
        let winners = contract.recent_winners(RECENT_WINNERS_LIMIT).await?;
        Ok(Dashboard {
            ticket_price,
            summary,
            pools,
            user_tickets,
            winners,
        })
    }

    /// Run the full purchase flow for `ticket_count` tickets.
    ///
    /// Requires a `Connected` session on the required chain. Only one
    /// purchase may be outstanding at a time; a second attempt is rejected
    /// with `PurchaseInFlight` until the returned handle resolves or is
    /// dropped.
    pub async fn purchase_tickets(
        &self,
        contract: &LotteryContract,
        ticket_count: u32,
    ) -> Result<PurchaseHandle> {
        validate_ticket_count(ticket_count)?;

        let precondition = {
            let inner = self.lock();
            match (inner.session.status, inner.session.account) {
                (SessionStatus::Connected, Some(account)) => Ok(account),
                (SessionStatus::ChainMismatch, _) => Err(LottoSdkError::WrongChain {
                    actual: inner.session.chain_id.unwrap_or_default(),
                    required: self.required.chain_id,
                }),
                _ => Err(LottoSdkError::BackendUnavailable(
                    "no connected wallet session".into(),
                )),
            }
        };
        let account = precondition.map_err(|err| self.fail(err))?;

        if self
            .purchase_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(self.fail(LottoSdkError::PurchaseInFlight));
        }
        // Released when the handle resolves or is dropped, and on every
        // early return below.
        let slot = PurchaseGuard(Arc::clone(&self.purchase_pending));

        let unit_price = contract.ticket_price().await.map_err(|err| self.fail(err))?;
        let quote = TicketQuote::new(unit_price, ticket_count).map_err(|err| self.fail(err))?;
        self.lock().last_quote = Some(quote.clone());

        info!(ticket_count, total = %quote.total, "submitting ticket purchase");
        let submission = contract
            .buy_tickets(account, ticket_count, quote.total, PURCHASE_GAS_CEILING)
            .await
            .map_err(|err| {
                error!(error = %err, "ticket purchase failed");
                self.fail(err)
            })?;

        let receipt = PurchaseReceipt {
            tx_hash: submission.tx_hash(),
            ticket_count,
            total: quote.total,
            submitted_at: SystemTime::now(),
        };
        self.lock().receipts.record(receipt.clone());
        info!(tx_hash = %receipt.tx_hash, "ticket purchase submitted");

        Ok(PurchaseHandle {
            submission,
            receipt,
            _slot: slot,
        })
    }

    fn fail(&self, err: LottoSdkError) -> LottoSdkError {
        self.lock().last_error = Some(err.clone());
        err
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clear the session and cancel its tasks, returning the backend (if
    /// any) for best-effort teardown by the caller.
    fn reset_locked(inner: &mut Inner) -> Option<Arc<dyn WalletBackend>> {
        inner.epoch += 1;
        inner.connecting = false;
        inner.session = SessionSnapshot::disconnected();
        if let Some(refresh) = inner.refresh.take() {
            refresh.abort();
        }
        if let Some(pump) = inner.pump.take() {
            pump.abort();
        }
        inner.backend.take()
    }

    fn evaluate_chain_locked(inner: &mut Inner, required: u64) {
        if inner.session.account.is_none() {
            return;
        }
        let status = if inner.session.chain_id == Some(required) {
            SessionStatus::Connected
        } else {
            SessionStatus::ChainMismatch
        };
        if inner.session.status != status {
            if status == SessionStatus::ChainMismatch {
                warn!(
                    required,
                    actual = ?inner.session.chain_id,
                    "session is on the wrong chain"
                );
            }
            inner.session.status = status;
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(constants::required_chain())
    }
}

/// Awaitable handle for an outstanding ticket purchase.
///
/// Holds the single purchase slot; dropping the handle or awaiting
/// [`confirmed`] frees it for the next purchase.
///
/// [`confirmed`]: PurchaseHandle::confirmed
pub struct PurchaseHandle {
    submission: Submission,
    receipt: PurchaseReceipt,
    _slot: PurchaseGuard,
}

impl PurchaseHandle {
    pub fn tx_hash(&self) -> TxHash {
        self.submission.tx_hash()
    }

    pub fn receipt(&self) -> &PurchaseReceipt {
        &self.receipt
    }

    /// Wait for on-chain confirmation and release the purchase slot.
    pub async fn confirmed(self) -> Result<PurchaseReceipt> {
        self.submission.confirmed().await?;
        Ok(self.receipt)
    }
}

struct PurchaseGuard(Arc<AtomicBool>);

impl Drop for PurchaseGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
