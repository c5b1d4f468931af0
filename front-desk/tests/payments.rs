//! Payment ledger over the record gateway

mod common;

use std::sync::Arc;

use common::{ANA, BRUNO, CountingGateway, date, id};
use front_desk::ledger::{self, PaymentKind};
use front_desk::{InFlight, LedgerError, PaymentLedger};
use rust_decimal::Decimal;
use shared::{AppError, ErrorCode, MemberGateway};

#[tokio::test]
async fn test_invalid_amounts_leave_no_entry() {
    let store = common::store();
    let gateway = Arc::new(CountingGateway::new(store.clone()));
    let payments = PaymentLedger::new(gateway.clone());

    for input in ["abc", "0", "-5", "", "  "] {
        let err = payments.renew(&id(ANA), input).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)), "{input:?}: {err:?}");
    }

    assert_eq!(gateway.payments(), 0);
    let ana = store.find_by_id(&id(ANA)).await.unwrap();
    assert!(ana.payment_history.is_empty());
    assert_eq!(ana.payment_due_date, date(2024, 3, 15));
}

#[tokio::test]
async fn test_renewal_advances_due_date() {
    let store = common::store();
    let payments = PaymentLedger::new(store.clone());

    let member = payments.renew(&id(BRUNO), "1500").await.unwrap();
    assert_eq!(member.payment_due_date, date(2024, 4, 14));
    assert_eq!(member.payment_history.len(), 1);
    assert_eq!(member.payment_history[0].amount, Decimal::from(1500));

    // Two confirmed renewals advance twice
    let member = payments.renew(&id(BRUNO), "1500.50").await.unwrap();
    assert_eq!(member.payment_due_date, date(2024, 5, 14));
    assert_eq!(member.payment_history.len(), 2);
    assert_eq!(member.last_payment().unwrap().amount, Decimal::new(150050, 2));
}

#[tokio::test]
async fn test_ledger_only_keeps_due_date() {
    let store = common::store();
    let payments = PaymentLedger::new(store.clone());

    let member = payments.record_ledger_payment(&id(ANA), "800").await.unwrap();
    assert_eq!(member.payment_due_date, date(2024, 3, 15));
    assert_eq!(member.payment_history.len(), 1);

    let stored = store.find_by_id(&id(ANA)).await.unwrap();
    assert_eq!(stored, member);
}

#[tokio::test]
async fn test_renewal_preview_matches_confirmed_result() {
    let store = common::store();
    let before = store.find_by_id(&id(ANA)).await.unwrap();
    let preview = ledger::renewal_preview(&before);

    let payments = PaymentLedger::new(store);
    let after = payments.renew(&id(ANA), "1000").await.unwrap();

    assert_eq!(preview.current_due, before.payment_due_date);
    assert_eq!(preview.next_due, after.payment_due_date);
}

#[tokio::test]
async fn test_unknown_member() {
    let payments = PaymentLedger::new(common::store());

    let err = payments.renew(&id("11111111"), "1000").await.unwrap_err();
    assert_eq!(err, LedgerError::MemberNotFound(id("11111111")));

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::MemberNotFound);
}

#[tokio::test]
async fn test_transport_failure_surfaces() {
    let gateway = Arc::new(CountingGateway::new(common::store()));
    gateway.set_outage(true);
    let payments = PaymentLedger::new(gateway.clone());

    let err = payments
        .submit(PaymentKind::LedgerOnly, &id(ANA), "100")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Transport(_)));

    let ana = gateway.inner.find_by_id(&id(ANA)).await.unwrap();
    assert!(ana.payment_history.is_empty());
}

#[tokio::test]
async fn test_duplicate_submission_refused_while_in_flight() {
    let gateway = Arc::new(CountingGateway::gated(common::store()));
    let payments = PaymentLedger::new(gateway.clone());

    let first = {
        let payments = payments.clone();
        tokio::spawn(async move { payments.renew(&id(ANA), "1000").await })
    };
    while gateway.payments() == 0 {
        tokio::task::yield_now().await;
    }

    let err = payments.renew(&id(ANA), "1000").await.unwrap_err();
    assert_eq!(err, LedgerError::PaymentInProgress(id(ANA)));

    // Other members are not blocked; the first permit goes to the waiting renewal
    gateway.release(2);
    payments.record_ledger_payment(&id(BRUNO), "200").await.unwrap();

    let member = first.await.unwrap().unwrap();
    assert_eq!(member.payment_history.len(), 1);
    assert_eq!(member.payment_due_date, date(2024, 4, 15));
    assert_eq!(gateway.payments(), 2);

    // Guard released once the first submission settled
    gateway.release(1);
    let member = payments.record_ledger_payment(&id(ANA), "50").await.unwrap();
    assert_eq!(member.payment_history.len(), 2);
}

#[tokio::test]
async fn test_shared_guard_spans_services() {
    let gateway = Arc::new(CountingGateway::new(common::store()));
    let in_flight = InFlight::new();
    let payments = PaymentLedger::with_guard(gateway, in_flight.clone());

    let _held = in_flight.try_acquire(&id(ANA)).unwrap();
    let err = payments.renew(&id(ANA), "1000").await.unwrap_err();

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::PaymentInProgress);
}
