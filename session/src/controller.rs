//! The session state machine.
//!
//! [`SessionController`] owns the one [`Session`] of a client and is the only
//! writer to it. Commands are `async` and run on a single thread; at most one
//! command holds the in-flight slot at a time, and every write is checked
//! against the generation it was started under so that results from an
//! epoch the user already left are dropped instead of committed.

use std::cell::Cell;
use std::collections::HashSet;

use proofdesk_contract::{ContractClient, ContractError};
use proofdesk_provider::{ProviderError, ProviderGateway};
use proofdesk_types::{
    AccountView, Address, ConnectError, ProofTerms, ProofView, Session, SessionStatus, TxReceipt,
};
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

use crate::aggregator::AccountAggregator;
use crate::spans::{open_session_span, proof_command_span, refresh_span};

/// Result of [`SessionController::open_session`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Accounts were discovered and aggregated; the session is `Connected`.
    Connected { accounts: Vec<AccountView> },
    /// The provider exposed no account even after `connect`. The session
    /// returns to `Disconnected` with no error recorded.
    NoAuthorizedAccounts,
    /// The provider failed or refused; the session holds the same error.
    Failed(ConnectError),
    /// Another command was in flight. Nothing was written.
    AlreadyInFlight,
    /// The session was closed or reopened before this attempt finished.
    /// Its result was discarded.
    Stale,
}

/// Result of [`SessionController::refresh`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed { accounts: Vec<AccountView> },
    NotConnected,
    Busy,
    Stale,
}

/// Result of a proof command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofOutcome {
    Created(TxReceipt),
    Updated(TxReceipt),
    /// The pre-submission read showed the command cannot apply:
    /// [`ContractError::AlreadyExists`] for a create,
    /// [`ContractError::NotConfigured`] for an update. Nothing was submitted.
    Refused(ContractError),
    NotConnected,
    /// The address is not one of the session's accounts.
    UnknownAccount,
    Busy,
    /// The pre-submission read or the submission itself failed.
    Failed(ContractError),
}

impl ProofOutcome {
    /// Whether a transaction was confirmed.
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Updated(_))
    }

    pub fn receipt(&self) -> Option<&TxReceipt> {
        match self {
            Self::Created(r) | Self::Updated(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProofCommand {
    Create,
    Update,
}

impl ProofCommand {
    fn name(self) -> &'static str {
        match self {
            ProofCommand::Create => "create_proof",
            ProofCommand::Update => "update_proof",
        }
    }

    /// Check the freshly read proof state against what this command needs.
    fn precondition(self, address: &Address, current: &ProofView) -> Result<(), ContractError> {
        match (self, current.is_configured()) {
            (ProofCommand::Create, true) => Err(ContractError::AlreadyExists(address.clone())),
            (ProofCommand::Update, false) => Err(ContractError::NotConfigured(address.clone())),
            _ => Ok(()),
        }
    }

    fn outcome(self, receipt: TxReceipt) -> ProofOutcome {
        match self {
            ProofCommand::Create => ProofOutcome::Created(receipt),
            ProofCommand::Update => ProofOutcome::Updated(receipt),
        }
    }
}

/// Holds the in-flight slot for the duration of one command.
///
/// Released on drop, but only if the slot still holds this command's id:
/// `close_session` may have freed it and a newer command taken it since.
struct OperationGuard<'a> {
    slot: &'a Cell<Option<u64>>,
    op: u64,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if self.slot.get() == Some(self.op) {
            self.slot.set(None);
        }
    }
}

/// Owns the session and sequences every command against the provider and
/// contract facades.
///
/// The controller is `!Send` and expects a current-thread runtime or a
/// `LocalSet`. Readers observe the session through [`snapshot`] or a
/// [`subscribe`] receiver; both only ever see fully committed states.
///
/// [`snapshot`]: SessionController::snapshot
/// [`subscribe`]: SessionController::subscribe
pub struct SessionController<P, C> {
    provider: P,
    contract: C,
    session: watch::Sender<Session>,
    /// Bumped by `open_session` and `close_session`.
    generation: Cell<u64>,
    in_flight: Cell<Option<u64>>,
    next_op: Cell<u64>,
}

impl<P: ProviderGateway, C: ContractClient> SessionController<P, C> {
    pub fn new(provider: P, contract: C) -> Self {
        let (session, _rx) = watch::channel(Session::new());
        Self {
            provider,
            contract,
            session,
            generation: Cell::new(0),
            in_flight: Cell::new(None),
            next_op: Cell::new(0),
        }
    }

    /// A full copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Receive every committed session state from now on.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.borrow().status.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get().is_some()
    }

    /// Discover (and if needed authorize) accounts, then aggregate them.
    pub async fn open_session(&self) -> OpenOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!("open_session ignored, another command is in flight");
            return OpenOutcome::AlreadyInFlight;
        };
        let generation = self.bump_generation();
        self.run_open(generation)
            .instrument(open_session_span(generation))
            .await
    }

    async fn run_open(&self, generation: u64) -> OpenOutcome {
        self.commit(
            generation,
            Session {
                status: SessionStatus::Connecting,
                accounts: Vec::new(),
            },
        );

        let addresses = match self.authorized_accounts().await {
            Ok(addresses) => addresses,
            Err(err) => {
                warn!(error = %err, "wallet did not connect");
                let reason = err.to_connect_error();
                let failed = Session {
                    status: SessionStatus::ConnectError(reason.clone()),
                    accounts: Vec::new(),
                };
                if !self.commit(generation, failed) {
                    return OpenOutcome::Stale;
                }
                return OpenOutcome::Failed(reason);
            }
        };

        if addresses.is_empty() {
            if !self.commit(generation, Session::new()) {
                return OpenOutcome::Stale;
            }
            info!("no authorized accounts after connect");
            return OpenOutcome::NoAuthorizedAccounts;
        }

        let accounts = self.aggregator().aggregate(&addresses).await;
        let connected = Session {
            status: SessionStatus::Connected,
            accounts: accounts.clone(),
        };
        if !self.commit(generation, connected) {
            return OpenOutcome::Stale;
        }
        info!(accounts = accounts.len(), "session connected");
        OpenOutcome::Connected { accounts }
    }

    /// `discover`, falling back to `connect` + `discover` when nothing is
    /// exposed yet. Duplicate addresses are dropped, first occurrence wins.
    async fn authorized_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let mut accounts = self.provider.discover().await?;
        if accounts.is_empty() {
            debug!("no accounts exposed, requesting authorization");
            self.provider.connect().await?;
            accounts = self.provider.discover().await?;
        }
        let mut seen = HashSet::new();
        accounts.retain(|a| seen.insert(a.clone()));
        Ok(accounts)
    }

    /// Reset to `Disconnected` without contacting the provider.
    ///
    /// Any command still in flight keeps running but can no longer commit.
    pub fn close_session(&self) {
        let generation = self.bump_generation();
        self.in_flight.set(None);
        self.session.send_replace(Session::new());
        info!(generation, "session closed");
    }

    /// Re-aggregate the current account set.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.status().is_connected() {
            return RefreshOutcome::NotConnected;
        }
        let Some(_guard) = self.try_begin() else {
            return RefreshOutcome::Busy;
        };
        let generation = self.generation.get();
        let addresses = self.addresses();

        let accounts = self
            .aggregator()
            .aggregate(&addresses)
            .instrument(refresh_span(generation))
            .await;
        let refreshed = Session {
            status: SessionStatus::Connected,
            accounts: accounts.clone(),
        };
        if !self.commit(generation, refreshed) {
            return RefreshOutcome::Stale;
        }
        RefreshOutcome::Refreshed { accounts }
    }

    /// Create a proof for `address` unless one already exists.
    ///
    /// The proof is re-read right before submission. On success the
    /// account's view is refetched and replaced before this returns.
    pub async fn create_proof_for(&self, address: &Address, terms: ProofTerms) -> ProofOutcome {
        self.run_proof_command(ProofCommand::Create, address, terms)
            .await
    }

    /// Update the existing proof of `address`.
    pub async fn update_proof_for(&self, address: &Address, terms: ProofTerms) -> ProofOutcome {
        self.run_proof_command(ProofCommand::Update, address, terms)
            .await
    }

    async fn run_proof_command(
        &self,
        command: ProofCommand,
        address: &Address,
        terms: ProofTerms,
    ) -> ProofOutcome {
        // The session's spelling of the address, which may differ in case.
        let account = {
            let session = self.session.borrow();
            if !session.status.is_connected() {
                return ProofOutcome::NotConnected;
            }
            match session.account(address) {
                Some(view) => view.address.clone(),
                None => return ProofOutcome::UnknownAccount,
            }
        };
        let Some(_guard) = self.try_begin() else {
            return ProofOutcome::Busy;
        };
        let generation = self.generation.get();

        self.submit_proof(command, &account, terms, generation)
            .instrument(proof_command_span(command.name(), &account))
            .await
    }

    async fn submit_proof(
        &self,
        command: ProofCommand,
        address: &Address,
        terms: ProofTerms,
        generation: u64,
    ) -> ProofOutcome {
        let current = match self.contract.read_proof(address).await {
            Ok(view) => view,
            Err(err) => {
                warn!(error = %err, "proof re-check failed, not submitting");
                return ProofOutcome::Failed(err);
            }
        };
        if let Err(refusal) = command.precondition(address, &current) {
            info!(reason = %refusal, "proof command skipped");
            return ProofOutcome::Refused(refusal);
        }

        let submitted = match command {
            ProofCommand::Create => self.contract.create_proof(address, terms).await,
            ProofCommand::Update => self.contract.update_proof(address, terms).await,
        };
        let receipt = match submitted {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(error = %err, "proof submission failed");
                return ProofOutcome::Failed(err);
            }
        };
        info!(tx = %receipt.tx_hash, "proof submitted");

        let view = self.aggregator().fetch_account(address).await;
        if !self.replace_account(generation, view) {
            debug!("session changed during submission, refreshed account dropped");
        }
        command.outcome(receipt)
    }

    fn aggregator(&self) -> AccountAggregator<'_, P, C> {
        AccountAggregator::new(&self.provider, &self.contract)
    }

    fn addresses(&self) -> Vec<Address> {
        self.session
            .borrow()
            .accounts
            .iter()
            .map(|a| a.address.clone())
            .collect()
    }

    fn try_begin(&self) -> Option<OperationGuard<'_>> {
        if self.in_flight.get().is_some() {
            return None;
        }
        let op = self.next_op.get() + 1;
        self.next_op.set(op);
        self.in_flight.set(Some(op));
        Some(OperationGuard {
            slot: &self.in_flight,
            op,
        })
    }

    fn bump_generation(&self) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        generation
    }

    /// Publish `session` if `generation` is still current.
    fn commit(&self, generation: u64, session: Session) -> bool {
        if self.generation.get() != generation {
            debug!(
                generation,
                current = self.generation.get(),
                "discarding stale session result"
            );
            return false;
        }
        self.session.send_replace(session);
        true
    }

    /// Swap in a fresh view for one account if `generation` is still current.
    fn replace_account(&self, generation: u64, view: AccountView) -> bool {
        if self.generation.get() != generation {
            return false;
        }
        self.session.send_if_modified(|session| {
            match session
                .accounts
                .iter_mut()
                .find(|a| a.address == view.address)
            {
                Some(slot) => {
                    *slot = view;
                    true
                }
                None => false,
            }
        })
    }
}
