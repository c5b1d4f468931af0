//! Member directory: registration, edits and removal

use std::sync::Arc;

use shared::{AppError, ErrorCode, GatewayError, Member, MemberGateway, MemberId, MemberUpdate};
use thiserror::Error;

use crate::clock::CivilCalendar;
use crate::in_flight::InFlight;
use crate::intake::{self, MemberDraft};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectoryError {
    /// Form problem, shown next to the field
    #[error("{0}")]
    Invalid(AppError),

    #[error("member {0} not found")]
    NotFound(MemberId),

    #[error("member {0} already has a change in progress")]
    Busy(MemberId),

    #[error("member {0} already exists")]
    AlreadyExists(MemberId),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<GatewayError> for DirectoryError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(id) => DirectoryError::NotFound(id),
            GatewayError::AlreadyExists(id) => DirectoryError::AlreadyExists(id),
            GatewayError::InvalidAmount(msg) | GatewayError::Rejected(msg) => {
                DirectoryError::Rejected(msg)
            }
            GatewayError::Transport(msg) => DirectoryError::Transport(msg),
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Invalid(e) => e,
            DirectoryError::NotFound(id) => AppError::member_not_found(id.as_str()),
            DirectoryError::Busy(id) => AppError::with_message(
                ErrorCode::AlreadyExists,
                format!("Member {} already has a change in progress", id),
            ),
            DirectoryError::AlreadyExists(id) => AppError::member_already_exists(id.as_str()),
            DirectoryError::Rejected(msg) => AppError::with_message(ErrorCode::InvalidRequest, msg),
            DirectoryError::Transport(msg) => AppError::network(msg),
        }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Member CRUD over the record gateway
#[derive(Clone)]
pub struct MemberDirectory {
    gateway: Arc<dyn MemberGateway>,
    calendar: CivilCalendar,
    in_flight: InFlight,
}

impl MemberDirectory {
    pub fn new(
        gateway: Arc<dyn MemberGateway>,
        calendar: CivilCalendar,
        in_flight: InFlight,
    ) -> Self {
        Self {
            gateway,
            calendar,
            in_flight,
        }
    }

    pub async fn list(&self) -> DirectoryResult<Vec<Member>> {
        Ok(self.gateway.list().await?)
    }

    pub async fn get(&self, id: &MemberId) -> DirectoryResult<Member> {
        Ok(self.gateway.find_by_id(id).await?)
    }

    /// Validate the form and create the member
    pub async fn register(&self, draft: &MemberDraft) -> DirectoryResult<Member> {
        let create =
            intake::validate(draft, self.calendar.today()).map_err(DirectoryError::Invalid)?;
        let id = create.id.clone();

        let _guard = self.claim(&id)?;
        let member = self.gateway.create(create).await?;
        tracing::info!(dni = %id, "Member registered");
        Ok(member)
    }

    /// Validate the form and patch the member
    pub async fn edit(&self, id: &MemberId, draft: &MemberDraft) -> DirectoryResult<Member> {
        let patch = intake::validate_update(draft).map_err(DirectoryError::Invalid)?;
        self.patch(id, patch).await
    }

    /// Soft removal
    pub async fn deactivate(&self, id: &MemberId) -> DirectoryResult<Member> {
        self.patch(id, MemberUpdate::deactivate()).await
    }

    /// Hard removal
    pub async fn remove(&self, id: &MemberId) -> DirectoryResult<()> {
        let _guard = self.claim(id)?;
        self.gateway.delete(id).await?;
        tracing::info!(dni = %id, "Member removed");
        Ok(())
    }

    async fn patch(&self, id: &MemberId, patch: MemberUpdate) -> DirectoryResult<Member> {
        let _guard = self.claim(id)?;
        let member = self.gateway.update(id, patch).await?;
        tracing::info!(dni = %id, active = member.active, "Member updated");
        Ok(member)
    }

    fn claim(&self, id: &MemberId) -> DirectoryResult<crate::in_flight::InFlightGuard> {
        self.in_flight.try_acquire(id).ok_or_else(|| {
            tracing::warn!(dni = %id, "Duplicate submission refused");
            DirectoryError::Busy(id.clone())
        })
    }
}
