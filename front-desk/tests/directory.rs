//! Member directory over the in-memory store

mod common;

use std::sync::Arc;

use common::{ANA, BRUNO, CountingGateway, date, id};
use front_desk::intake::MemberDraft;
use front_desk::{DirectoryError, InFlight, MemberDirectory, Roster};
use shared::{AppError, ErrorCode, MemberGateway, PlanType};

fn directory(gateway: Arc<dyn MemberGateway>) -> (MemberDirectory, InFlight) {
    let in_flight = InFlight::new();
    let directory = MemberDirectory::new(gateway, common::calendar(), in_flight.clone());
    (directory, in_flight)
}

fn draft(dni: &str) -> MemberDraft {
    MemberDraft {
        dni: dni.into(),
        name: "Carla".into(),
        last_name: "Ruiz".into(),
        email: "carla@example.com".into(),
        plan_type: "Semanal".into(),
        payment_due_date: "2024-04-15".into(),
        ..MemberDraft::default()
    }
}

#[tokio::test]
async fn test_register_member() {
    let store = common::store();
    let (directory, _) = directory(store.clone());

    let member = directory.register(&draft("40111222")).await.unwrap();
    assert_eq!(member.plan_type, PlanType::Weekly);
    assert_eq!(member.payment_due_date, date(2024, 4, 15));
    // Blank join date means today in the gym's zone
    assert_eq!(member.join_date, Some(date(2024, 3, 15)));
    assert_eq!(member.medication.as_deref(), Some("Ninguno"));
    assert!(member.payment_history.is_empty());

    // Listed last by the store, shown first on the roster
    let roster = Roster::from_listing(directory.list().await.unwrap());
    assert_eq!(roster.members()[0].id, id("40111222"));
}

#[tokio::test]
async fn test_register_rejects_bad_form_before_any_request() {
    let store = common::store();
    let (directory, _) = directory(store.clone());

    let err = directory.register(&draft("4011")).await.unwrap_err();
    let DirectoryError::Invalid(app) = err else {
        panic!("expected a form error");
    };
    assert_eq!(app.code, ErrorCode::MemberIdInvalid);

    let mut missing_name = draft("40111222");
    missing_name.name = "  ".into();
    let err: AppError = directory.register(&missing_name).await.unwrap_err().into();
    assert_eq!(err.code, ErrorCode::RequiredField);

    assert_eq!(store.snapshot().len(), 2);
}

#[tokio::test]
async fn test_duplicate_dni_rejected() {
    let (directory, _) = directory(common::store());

    let err = directory.register(&draft(ANA)).await.unwrap_err();
    assert_eq!(err, DirectoryError::AlreadyExists(id(ANA)));

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::MemberAlreadyExists);
}

#[tokio::test]
async fn test_busy_member_refused() {
    let (directory, in_flight) = directory(common::store());

    let _held = in_flight.try_acquire(&id(BRUNO)).unwrap();
    let err = directory.deactivate(&id(BRUNO)).await.unwrap_err();
    assert_eq!(err, DirectoryError::Busy(id(BRUNO)));

    // Other members unaffected
    directory.deactivate(&id(ANA)).await.unwrap();
}

#[tokio::test]
async fn test_edit_keeps_ledger() {
    let store = common::store();
    let (directory, _) = directory(store.clone());
    store.renew_payment(&id(ANA), "1000".parse().unwrap()).await.unwrap();

    let current = directory.get(&id(ANA)).await.unwrap();
    let mut form = MemberDraft::from_member(&current);
    form.phone = "11 5555-0000".into();
    form.plan_type = "Semanal".into();

    let edited = directory.edit(&id(ANA), &form).await.unwrap();
    assert_eq!(edited.phone.as_deref(), Some("11 5555-0000"));
    assert_eq!(edited.plan_type, PlanType::Weekly);
    assert_eq!(edited.payment_history, current.payment_history);
    assert_eq!(edited.payment_due_date, current.payment_due_date);
}

#[tokio::test]
async fn test_deactivate_then_remove() {
    let store = common::store();
    let (directory, _) = directory(store.clone());

    let member = directory.deactivate(&id(BRUNO)).await.unwrap();
    assert!(!member.active);
    assert_eq!(member.name, "Bruno");

    directory.remove(&id(BRUNO)).await.unwrap();
    let err = directory.get(&id(BRUNO)).await.unwrap_err();
    assert_eq!(err, DirectoryError::NotFound(id(BRUNO)));

    let err = directory.remove(&id(BRUNO)).await.unwrap_err();
    assert_eq!(err, DirectoryError::NotFound(id(BRUNO)));
}

#[tokio::test]
async fn test_transport_failure() {
    let gateway = Arc::new(CountingGateway::new(common::store()));
    gateway.set_outage(true);
    let (directory, in_flight) = directory(gateway);

    let err = directory.deactivate(&id(ANA)).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Transport(_)));
    let app: AppError = err.into();
    assert!(app.is_transport());

    // Guard released on failure
    assert!(!in_flight.is_busy(&id(ANA)));
}
