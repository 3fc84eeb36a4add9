//! End-to-end session scenarios against the nullable provider and contract:
//! connection lifecycle, per-account failure isolation, proof commands, and
//! interleaved commands on a single-threaded runtime.

use proofdesk_nullables::{NullContract, NullProvider, ProviderCall};
use proofdesk_provider::{ProviderError, ProviderFault};
use proofdesk_session::{OpenOutcome, ProofOutcome, RefreshOutcome, SessionController};
use proofdesk_types::{
    Address, BalanceView, ConnectError, ProofRecord, ProofTerms, ProofView, Session,
    SessionStatus,
};
use tokio::task::yield_now;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn wire(
    provider: &NullProvider,
    contract: &NullContract,
) -> SessionController<NullProvider, NullContract> {
    SessionController::new(provider.clone(), contract.clone())
}

fn terms() -> ProofTerms {
    ProofTerms {
        proof_type: 2,
        interval: 3_600,
        amount: 10_000,
    }
}

fn addresses(session: &Session) -> Vec<&str> {
    session.accounts.iter().map(|a| a.address.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn connect_reveals_accounts_after_empty_discovery() {
    let provider = NullProvider::new().grant_on_connect(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    let gate = provider.hold();
    let mut rx = ctl.subscribe();

    let (outcome, connecting) = tokio::join!(ctl.open_session(), async {
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        gate.open();
        seen
    });

    assert_eq!(connecting.status, SessionStatus::Connecting);
    assert!(connecting.accounts.is_empty());
    assert!(matches!(outcome, OpenOutcome::Connected { ref accounts } if accounts.len() == 1));

    let session = ctl.snapshot();
    assert_eq!(session.status, SessionStatus::Connected);
    assert_eq!(addresses(&session), vec!["0xA"]);
    assert_eq!(
        provider.calls()[..3],
        [ProviderCall::Discover, ProviderCall::Connect, ProviderCall::Discover]
    );
}

#[tokio::test]
async fn user_rejection_becomes_connect_error() {
    let provider = NullProvider::new().grant_on_connect(&["0xA"]);
    provider.reject_connect(ProviderError::UserRejected(ProviderFault::new(
        Some("4001".into()),
        "User rejected",
    )));
    let ctl = wire(&provider, &NullContract::new());

    let outcome = ctl.open_session().await;

    let expected = ConnectError::new(Some("4001".into()), "User rejected");
    assert_eq!(outcome, OpenOutcome::Failed(expected.clone()));
    let session = ctl.snapshot();
    assert_eq!(session.status, SessionStatus::ConnectError(expected));
    assert!(session.accounts.is_empty());
}

#[tokio::test]
async fn other_provider_errors_pass_code_through() {
    let provider = NullProvider::new();
    provider.fail_discover(ProviderError::Provider(ProviderFault::new(
        Some("-32002".into()),
        "Request already pending",
    )));
    let ctl = wire(&provider, &NullContract::new());

    ctl.open_session().await;

    let error = ctl.status().connect_error().cloned().unwrap();
    assert_eq!(error.code.as_deref(), Some("-32002"));
    assert_eq!(error.message, "Request already pending");
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_balance_is_isolated_to_its_account() {
    let provider = NullProvider::new().with_accounts(&["0xA", "0xB"]);
    provider.set_balance("0xA", 123);
    provider.fail_balance("0xB", ProviderError::Rpc("connection reset".into()));
    let ctl = wire(&provider, &NullContract::new());

    ctl.open_session().await;

    let session = ctl.snapshot();
    assert_eq!(addresses(&session), vec!["0xA", "0xB"]);
    assert_eq!(session.accounts[0].native_balance, BalanceView::Value(123));
    assert!(session.accounts[1].native_balance.is_error());
    assert_eq!(session.accounts[0].proof, ProofView::NotConfigured);
    assert_eq!(session.accounts[1].proof, ProofView::NotConfigured);
}

// ---------------------------------------------------------------------------
// Proof commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unconfigured_proof_allows_creation() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    ctl.open_session().await;
    assert_eq!(ctl.snapshot().accounts[0].proof, ProofView::NotConfigured);

    let outcome = ctl.create_proof_for(&Address::new("0xA"), terms()).await;

    assert!(matches!(outcome, ProofOutcome::Created(_)));
    assert_eq!(contract.create_attempts(), 1);
    assert!(ctl.snapshot().accounts[0].proof.is_configured());
}

#[tokio::test]
async fn second_create_short_circuits() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    ctl.open_session().await;
    let a = Address::new("0xA");

    assert!(ctl.create_proof_for(&a, terms()).await.is_submitted());
    let second = ctl.create_proof_for(&a, terms()).await;

    assert_eq!(
        second,
        ProofOutcome::Refused(proofdesk_contract::ContractError::AlreadyExists(a))
    );
    assert_eq!(contract.create_attempts(), 1);
}

#[tokio::test]
async fn existing_proof_seen_at_recheck_is_not_resubmitted() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    ctl.open_session().await;

    // Created elsewhere after the session was aggregated.
    contract.set_proof(
        "0xA",
        ProofRecord {
            terms: terms(),
            status: 1,
        },
    );
    let outcome = ctl.create_proof_for(&Address::new("0xA"), terms()).await;

    assert!(matches!(outcome, ProofOutcome::Refused(_)));
    assert_eq!(contract.create_attempts(), 0);
}

#[tokio::test]
async fn address_case_does_not_split_an_account() {
    const CHECKSUM: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const LOWER: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
    let provider = NullProvider::new().with_accounts(&[CHECKSUM, LOWER]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    ctl.open_session().await;

    assert_eq!(addresses(&ctl.snapshot()), vec![CHECKSUM]);

    let outcome = ctl.create_proof_for(&Address::new(LOWER), terms()).await;

    let receipt = outcome.receipt().cloned().unwrap();
    assert_eq!(receipt.from.as_str(), CHECKSUM);
    assert!(contract.proof(CHECKSUM).is_some());
    assert!(ctl.snapshot().accounts[0].proof.is_configured());
}

// ---------------------------------------------------------------------------
// Interleaving
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overlapping_open_is_ignored() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    let gate = provider.hold();

    let (first, second) = tokio::join!(ctl.open_session(), async {
        while !provider.calls().contains(&ProviderCall::Discover) {
            yield_now().await;
        }
        let second = ctl.open_session().await;
        gate.open();
        second
    });

    assert!(matches!(first, OpenOutcome::Connected { .. }));
    assert_eq!(second, OpenOutcome::AlreadyInFlight);
    assert_eq!(provider.count(&ProviderCall::Discover), 1);
    assert_eq!(addresses(&ctl.snapshot()), vec!["0xA"]);
    assert!(!ctl.is_busy());
}

#[tokio::test]
async fn close_during_aggregation_discards_result() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    let gate = contract.hold();

    let (outcome, ()) = tokio::join!(ctl.open_session(), async {
        while contract.reads() == 0 {
            yield_now().await;
        }
        ctl.close_session();
        gate.open();
    });

    assert_eq!(outcome, OpenOutcome::Stale);
    assert_eq!(ctl.snapshot(), Session::new());
}

#[tokio::test]
async fn reopen_after_close_wins_over_stale_attempt() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    let gate = contract.hold();

    let (first, second) = tokio::join!(ctl.open_session(), async {
        while contract.reads() == 0 {
            yield_now().await;
        }
        ctl.close_session();
        let (second, ()) = tokio::join!(ctl.open_session(), async {
            while contract.reads() < 2 {
                yield_now().await;
            }
            gate.open();
        });
        second
    });

    assert_eq!(first, OpenOutcome::Stale);
    assert!(matches!(second, OpenOutcome::Connected { .. }));
    assert_eq!(ctl.status(), SessionStatus::Connected);
    assert!(!ctl.is_busy());
}

#[tokio::test]
async fn proof_command_while_refreshing_is_busy() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    ctl.open_session().await;
    let gate = contract.hold();

    let (_, busy) = tokio::join!(ctl.refresh(), async {
        while contract.reads() < 2 {
            yield_now().await;
        }
        let busy = ctl.create_proof_for(&Address::new("0xA"), terms()).await;
        gate.open();
        busy
    });

    assert_eq!(busy, ProofOutcome::Busy);
    assert_eq!(contract.create_attempts(), 0);
}

#[tokio::test]
async fn close_during_refresh_discards_result() {
    let provider = NullProvider::new().with_accounts(&["0xA"]);
    let contract = NullContract::new();
    let ctl = wire(&provider, &contract);
    ctl.open_session().await;
    let gate = contract.hold();

    let (outcome, ()) = tokio::join!(ctl.refresh(), async {
        while contract.reads() < 2 {
            yield_now().await;
        }
        ctl.close_session();
        gate.open();
    });

    assert_eq!(outcome, RefreshOutcome::Stale);
    assert_eq!(ctl.snapshot(), Session::new());
    assert_eq!(ctl.status(), SessionStatus::Disconnected);
    assert!(!ctl.is_busy());
}
