#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use front_desk::{CivilCalendar, ManualClock, MemoryGateway};
use shared::{
    DailyAttendee, GatewayError, GatewayResult, Member, MemberCreate, MemberGateway, MemberId,
    MemberUpdate, PaymentAmount, PlanType,
};
use tokio::sync::Semaphore;

pub const ANA: &str = "30123456";
pub const BRUNO: &str = "28999111";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn id(dni: &str) -> MemberId {
    MemberId::parse(dni).unwrap()
}

/// 2024-03-15 10:00 in Buenos Aires
pub fn calendar() -> CivilCalendar {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 13, 0, 0).unwrap());
    CivilCalendar::new(front_desk::clock::DEFAULT_TIMEZONE, Arc::new(clock))
}

pub fn member(dni: &str, name: &str, due: NaiveDate) -> Member {
    MemberCreate {
        id: id(dni),
        name: name.into(),
        last_name: "Gómez".into(),
        email: None,
        phone: None,
        birth_date: None,
        plan_type: PlanType::Full,
        payment_due_date: due,
        join_date: date(2024, 1, 10),
        medication: None,
        conditions: None,
        active: true,
    }
    .into_member()
}

pub fn store() -> Arc<MemoryGateway> {
    Arc::new(MemoryGateway::with_members(
        calendar(),
        vec![
            member(ANA, "Ana", date(2024, 3, 15)),
            member(BRUNO, "Bruno", date(2024, 3, 14)),
        ],
    ))
}

/// Wraps the in-memory store, counts calls and can hold mutations at a gate
pub struct CountingGateway {
    pub inner: Arc<MemoryGateway>,
    gate: Option<Semaphore>,
    outage: AtomicBool,
    lookups: AtomicUsize,
    payments: AtomicUsize,
}

impl CountingGateway {
    pub fn new(inner: Arc<MemoryGateway>) -> Self {
        Self {
            inner,
            gate: None,
            outage: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
            payments: AtomicUsize::new(0),
        }
    }

    /// Lookups and payments wait for [`CountingGateway::release`]
    pub fn gated(inner: Arc<MemoryGateway>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(inner)
        }
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn payments(&self) -> usize {
        self.payments.load(Ordering::SeqCst)
    }

    async fn pass(&self) -> GatewayResult<()> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.outage.load(Ordering::SeqCst) {
            return Err(GatewayError::transport("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl MemberGateway for CountingGateway {
    async fn find_by_id(&self, id: &MemberId) -> GatewayResult<Member> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.pass().await?;
        self.inner.find_by_id(id).await
    }

    async fn list(&self) -> GatewayResult<Vec<Member>> {
        self.inner.list().await
    }

    async fn create(&self, member: MemberCreate) -> GatewayResult<Member> {
        self.inner.create(member).await
    }

    async fn update(&self, id: &MemberId, patch: MemberUpdate) -> GatewayResult<Member> {
        self.pass().await?;
        self.inner.update(id, patch).await
    }

    async fn renew_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member> {
        self.payments.fetch_add(1, Ordering::SeqCst);
        self.pass().await?;
        self.inner.renew_payment(id, amount).await
    }

    async fn ledger_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member> {
        self.payments.fetch_add(1, Ordering::SeqCst);
        self.pass().await?;
        self.inner.ledger_payment(id, amount).await
    }

    async fn record_attendance(&self, id: &MemberId) -> GatewayResult<()> {
        self.inner.record_attendance(id).await
    }

    async fn attendance_by_date(&self, date: NaiveDate) -> GatewayResult<Vec<DailyAttendee>> {
        self.inner.attendance_by_date(date).await
    }

    async fn delete(&self, id: &MemberId) -> GatewayResult<()> {
        self.inner.delete(id).await
    }
}
