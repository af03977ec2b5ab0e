use std::time::Duration;

use chrono::NaiveDate;
use supply_sdk::testing::{
    Call, MOCK_SENDER, MOCK_TX_HASH, MockChain, contract_created_log, sample_draft, test_parties,
    unrelated_log,
};
use supply_sdk::{
    ConfirmationFailure, ContractId, ContractInput, SideEffect, SubmitError,
    create_contract_on_chain, submit_contract, validate,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
}

fn input() -> ContractInput {
    let validated = validate(&sample_draft(today()), today()).unwrap();
    ContractInput::new(validated, test_parties())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn happy_path_returns_first_contract_id() {
    let chain = MockChain::with_logs(vec![contract_created_log(17), contract_created_log(99)]);

    let id = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(id, ContractId::from(17));
    assert_eq!(
        chain.calls(),
        vec![Call::Simulate, Call::Send, Call::WaitForReceipt, Call::Decode]
    );

    let sent = chain.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, MOCK_SENDER);
    assert_eq!(sent[0].gas_limit, Some(250_000));
}

#[tokio::test]
async fn unrelated_logs_before_the_event_are_skipped() {
    let chain = MockChain::with_logs(vec![
        unrelated_log(0x01),
        unrelated_log(0x02),
        contract_created_log(5),
    ]);

    let id = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(id, ContractId::from(5));
    let decodes = chain.calls().iter().filter(|c| **c == Call::Decode).count();
    assert_eq!(decodes, 3);
}

#[tokio::test]
async fn missing_event_is_event_not_found() {
    let chain = MockChain::with_logs(vec![
        unrelated_log(0x01),
        unrelated_log(0x02),
        unrelated_log(0x03),
    ]);

    let err = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap_err();

    match &err {
        SubmitError::EventNotFound {
            tx_hash,
            logs_scanned,
        } => {
            assert_eq!(*tx_hash, MOCK_TX_HASH);
            assert_eq!(*logs_scanned, 3);
        }
        other => panic!("expected EventNotFound, got {other:?}"),
    }
    assert_eq!(err.outcome(), SideEffect::Committed);
    assert_eq!(err.kind(), "event_not_found");
}

#[tokio::test]
async fn simulation_revert_stops_before_send() {
    let chain = MockChain::reverting_simulation("contract id already exists");

    let err = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(&err, SubmitError::Simulation(msg) if msg.contains("contract id already exists")));
    assert_eq!(err.outcome(), SideEffect::None);
    assert_eq!(err.tx_hash(), None);
    assert_eq!(chain.calls(), vec![Call::Simulate]);
    assert!(chain.sent().is_empty());
}

#[tokio::test]
async fn send_failure_is_ambiguous() {
    let chain = MockChain::failing_send("connection reset");

    let err = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Submission(_)));
    assert_eq!(err.outcome(), SideEffect::Unknown);
    assert_eq!(chain.calls(), vec![Call::Simulate, Call::Send]);
}

#[tokio::test]
async fn confirmation_timeout() {
    let chain = MockChain::never_mined();

    let err = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap_err();

    match &err {
        SubmitError::Confirmation { tx_hash, failure } => {
            assert_eq!(*tx_hash, MOCK_TX_HASH);
            assert_eq!(*failure, ConfirmationFailure::Timeout);
        }
        other => panic!("expected Confirmation, got {other:?}"),
    }
    assert_eq!(err.outcome(), SideEffect::Unknown);
    assert_eq!(err.tx_hash(), Some(MOCK_TX_HASH));
}

#[tokio::test]
async fn receipt_rpc_error_is_confirmation_error() {
    let chain = MockChain::receipt_error("node unavailable");

    let err = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Confirmation {
            failure: ConfirmationFailure::Rpc(_),
            ..
        }
    ));
}

#[tokio::test]
async fn on_chain_revert_after_simulation() {
    let chain = MockChain::reverting_on_chain();

    let err = create_contract_on_chain(&chain, &chain, &input(), TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Confirmation {
            failure: ConfirmationFailure::Reverted,
            ..
        }
    ));
    assert_eq!(err.outcome(), SideEffect::Committed);
    // Logs of a reverted receipt are never inspected.
    assert!(!chain.calls().contains(&Call::Decode));
}

#[tokio::test]
async fn continuations_receive_the_outcome() {
    let ok_chain = MockChain::with_logs(vec![contract_created_log(3)]);
    let result = submit_contract(
        &ok_chain,
        &ok_chain,
        &input(),
        TIMEOUT,
        |id| format!("created {id}"),
        |e| format!("failed: {}", e.kind()),
    )
    .await;
    assert_eq!(result, "created 3");

    let bad_chain = MockChain::reverting_simulation("paused");
    let result = submit_contract(
        &bad_chain,
        &bad_chain,
        &input(),
        TIMEOUT,
        |id| format!("created {id}"),
        |e| format!("failed: {}", e.kind()),
    )
    .await;
    assert_eq!(result, "failed: simulation");
}

#[tokio::test]
async fn concurrent_submissions_share_nothing() {
    let a = MockChain::with_logs(vec![contract_created_log(1)]);
    let b = MockChain::with_logs(vec![contract_created_log(2)]);
    let input = input();

    let (ra, rb) = tokio::join!(
        create_contract_on_chain(&a, &a, &input, TIMEOUT),
        create_contract_on_chain(&b, &b, &input, TIMEOUT),
    );

    assert_eq!(ra.unwrap(), ContractId::from(1));
    assert_eq!(rb.unwrap(), ContractId::from(2));
}
