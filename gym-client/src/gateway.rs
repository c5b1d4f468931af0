//! `MemberGateway` over the members JSON API

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use shared::models::{DailyAttendanceReport, PaymentRequest};
use shared::{
    DailyAttendee, GatewayError, GatewayResult, Member, MemberCreate, MemberGateway, MemberId,
    MemberUpdate, PaymentAmount,
};

use crate::{ClientError, HttpClient};

/// Endpoint paths, relative to the base URL
///
/// The members API only publishes the lookup, check-in, create, update,
/// renewal and daily-attendance routes. [`ledger_payment`] and [`delete`]
/// follow the same naming but are assumed; adjust them when the server
/// exposes different routes.
pub mod paths {
    use chrono::NaiveDate;
    use shared::MemberId;

    pub const LIST: &str = "";
    pub const CREATE: &str = "nuevo";

    pub fn member(id: &MemberId) -> String {
        format!("alumno/{id}")
    }

    pub fn check_in(id: &MemberId) -> String {
        format!("ingresa/{id}")
    }

    pub fn update(id: &MemberId) -> String {
        format!("actualizar/{id}")
    }

    pub fn renew_payment(id: &MemberId) -> String {
        format!("agregar-pago/{id}")
    }

    pub fn ledger_payment(id: &MemberId) -> String {
        format!("registrar-pago/{id}")
    }

    pub fn attendance_by_date(date: NaiveDate) -> String {
        format!("asistencias-por-dia/{}", date.format("%Y-%m-%d"))
    }

    pub fn delete(id: &MemberId) -> String {
        format!("eliminar/{id}")
    }
}

/// Payment endpoints wrap the updated record
#[derive(Debug, Deserialize)]
struct PaymentResponse {
    student: Member,
}

/// Payment endpoints report amount problems as 400 / 422
fn payment_error(err: ClientError, id: &MemberId) -> GatewayError {
    match err {
        ClientError::Validation(msg) => GatewayError::InvalidAmount(msg),
        other => other.into_gateway(Some(id)),
    }
}

impl HttpClient {
    async fn submit_payment(
        &self,
        path: String,
        id: &MemberId,
        amount: PaymentAmount,
    ) -> GatewayResult<Member> {
        let body = PaymentRequest { amount };
        self.post::<PaymentResponse, _>(&path, &body)
            .await
            .map(|r| r.student)
            .map_err(|e| {
                tracing::warn!(dni = %id, error = %e, "Payment request failed");
                payment_error(e, id)
            })
    }
}

#[async_trait]
impl MemberGateway for HttpClient {
    async fn find_by_id(&self, id: &MemberId) -> GatewayResult<Member> {
        self.get(&paths::member(id))
            .await
            .map_err(|e| e.into_gateway(Some(id)))
    }

    async fn list(&self) -> GatewayResult<Vec<Member>> {
        self.get(paths::LIST).await.map_err(|e| e.into_gateway(None))
    }

    async fn create(&self, member: MemberCreate) -> GatewayResult<Member> {
        let id = member.id.clone();
        self.post(paths::CREATE, &member).await.map_err(|e| match e {
            ClientError::Conflict(_) => GatewayError::AlreadyExists(id),
            other => other.into_gateway(None),
        })
    }

    async fn update(&self, id: &MemberId, patch: MemberUpdate) -> GatewayResult<Member> {
        self.put(&paths::update(id), &patch)
            .await
            .map_err(|e| e.into_gateway(Some(id)))
    }

    async fn renew_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member> {
        self.submit_payment(paths::renew_payment(id), id, amount).await
    }

    async fn ledger_payment(&self, id: &MemberId, amount: PaymentAmount) -> GatewayResult<Member> {
        self.submit_payment(paths::ledger_payment(id), id, amount).await
    }

    async fn record_attendance(&self, id: &MemberId) -> GatewayResult<()> {
        self.get_discard(&paths::check_in(id))
            .await
            .map_err(|e| e.into_gateway(Some(id)))
    }

    async fn attendance_by_date(&self, date: NaiveDate) -> GatewayResult<Vec<DailyAttendee>> {
        self.get::<DailyAttendanceReport>(&paths::attendance_by_date(date))
            .await
            .map(|report| report.attendees)
            .map_err(|e| e.into_gateway(None))
    }

    async fn delete(&self, id: &MemberId) -> GatewayResult<()> {
        self.delete_empty(&paths::delete(id))
            .await
            .map_err(|e| e.into_gateway(Some(id)))
    }
}
