//! Listed members, newest first

use chrono::NaiveDate;
use shared::{Member, MembershipStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Current,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RosterSummary {
    pub total: usize,
    pub current: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// The collaborator lists oldest first; the roster shows newest first
    pub fn from_listing(mut members: Vec<Member>) -> Self {
        members.reverse();
        Self { members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// DNI substring, or case-insensitive match on name / last name
    pub fn search(&self, term: &str) -> Vec<&Member> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.members.iter().collect();
        }
        self.members
            .iter()
            .filter(|m| {
                m.id.as_str().contains(&needle)
                    || m.name.to_lowercase().contains(&needle)
                    || m.last_name.to_lowercase().contains(&needle)
                    || m.full_name().to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn filter(&self, filter: StatusFilter, today: NaiveDate) -> Vec<&Member> {
        self.members
            .iter()
            .filter(|m| match filter {
                StatusFilter::All => true,
                StatusFilter::Current => m.status(today) == MembershipStatus::Current,
                StatusFilter::Overdue => m.status(today) == MembershipStatus::Overdue,
            })
            .collect()
    }

    pub fn summary(&self, today: NaiveDate) -> RosterSummary {
        let overdue = self
            .members
            .iter()
            .filter(|m| m.status(today) == MembershipStatus::Overdue)
            .count();
        RosterSummary {
            total: self.members.len(),
            current: self.members.len() - overdue,
            overdue,
        }
    }

    /// Swap in a snapshot the collaborator confirmed
    ///
    /// Returns false when the member is not listed.
    pub fn replace(&mut self, member: Member) -> bool {
        match self.members.iter_mut().find(|m| m.id == member.id) {
            Some(slot) => {
                *slot = member;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &shared::MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.id != id);
        self.members.len() != before
    }
}
