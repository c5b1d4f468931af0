//! In-memory record store
//!
//! A [`MemberGateway`] that keeps members in process and applies the same
//! ledger rules the collaborator does. Backs the offline mode of the
//! binary and the engine's tests.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use shared::{
    DailyAttendee, GatewayError, GatewayResult, Member, MemberCreate, MemberGateway, MemberId,
    MemberUpdate, PaymentAmount,
};

use crate::clock::CivilCalendar;
use crate::ledger;

#[derive(Debug)]
pub struct MemoryGateway {
    members: RwLock<Vec<Member>>,
    calendar: CivilCalendar,
}

impl MemoryGateway {
    pub fn new(calendar: CivilCalendar) -> Self {
        Self::with_members(calendar, Vec::new())
    }

    pub fn with_members(calendar: CivilCalendar, members: Vec<Member>) -> Self {
        Self {
            members: RwLock::new(members),
            calendar,
        }
    }

    /// Seed from a JSON array in the collaborator's wire format
    pub fn from_json_file(calendar: CivilCalendar, path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let members: Vec<Member> = serde_json::from_str(&raw)?;
        tracing::info!(count = members.len(), path = %path.display(), "Loaded member seed");
        Ok(Self::with_members(calendar, members))
    }

    /// Copy of the current records
    pub fn snapshot(&self) -> Vec<Member> {
        self.members.read().clone()
    }

    fn modify<F>(&self, id: &MemberId, f: F) -> GatewayResult<Member>
    where
        F: FnOnce(&mut Member),
    {
        let mut members = self.members.write();
        let member = members
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| GatewayError::NotFound(id.clone()))?;
        f(member);
        Ok(member.clone())
    }
}

#[async_trait]
impl MemberGateway for MemoryGateway {
    async fn find_by_id(&self, id: &MemberId) -> GatewayResult<Member> {
        self.members
            .read()
            .iter()
            .find(|m| &m.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }

    async fn list(&self) -> GatewayResult<Vec<Member>> {
        Ok(self.snapshot())
    }

    async fn create(&self, member: MemberCreate) -> GatewayResult<Member> {
        let mut members = self.members.write();
        if members.iter().any(|m| m.id == member.id) {
            return Err(GatewayError::AlreadyExists(member.id));
        }
        let member = member.into_member();
        members.push(member.clone());
        Ok(member)
    }

    async fn update(&self, id: &MemberId, patch: MemberUpdate) -> GatewayResult<Member> {
        self.modify(id, |m| patch.apply_to(m))
    }

    async fn renew_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member> {
        let now = self.calendar.now();
        self.modify(id, |m| ledger::apply_renewal(m, amount, now))
    }

    async fn ledger_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member> {
        let now = self.calendar.now();
        self.modify(id, |m| ledger::apply_ledger_payment(m, amount, now))
    }

    async fn record_attendance(&self, id: &MemberId) -> GatewayResult<()> {
        let now = self.calendar.now();
        self.modify(id, |m| m.attendance_log.push(now)).map(|_| ())
    }

    async fn attendance_by_date(&self, date: NaiveDate) -> GatewayResult<Vec<DailyAttendee>> {
        let (start, end) = self.calendar.day_bounds(date);
        let attendees = self
            .members
            .read()
            .iter()
            .filter_map(|m| {
                let check_ins: Vec<_> = m
                    .attendance_log
                    .iter()
                    .filter(|ts| **ts >= start && **ts < end)
                    .copied()
                    .collect();
                (!check_ins.is_empty()).then(|| DailyAttendee {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    last_name: m.last_name.clone(),
                    email: m.email.clone(),
                    check_ins,
                })
            })
            .collect();
        Ok(attendees)
    }

    async fn delete(&self, id: &MemberId) -> GatewayResult<()> {
        let mut members = self.members.write();
        let before = members.len();
        members.retain(|m| &m.id != id);
        if members.len() == before {
            return Err(GatewayError::NotFound(id.clone()));
        }
        Ok(())
    }
}
