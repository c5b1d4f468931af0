//! Per-member duplicate-submission guard

use std::sync::Arc;

use dashmap::DashSet;
use shared::MemberId;

/// Members with a mutation currently in flight
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    members: Arc<DashSet<MemberId>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`, or `None` if a mutation for it is already running
    pub fn try_acquire(&self, id: &MemberId) -> Option<InFlightGuard> {
        if self.members.insert(id.clone()) {
            Some(InFlightGuard {
                members: self.members.clone(),
                id: id.clone(),
            })
        } else {
            None
        }
    }

    pub fn is_busy(&self, id: &MemberId) -> bool {
        self.members.contains(id)
    }
}

/// Releases the claim on drop
#[derive(Debug)]
pub struct InFlightGuard {
    members: Arc<DashSet<MemberId>>,
    id: MemberId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.members.remove(&self.id);
    }
}
