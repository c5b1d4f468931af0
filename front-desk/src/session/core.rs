//! Pure identification state machine
//!
//! `SessionCore` never touches a timer, a channel or the network. Every
//! transition returns the [`Effect`]s the driver has to carry out, which
//! keeps the rules testable without a runtime.

use shared::models::MEMBER_ID_LEN;
use shared::{GatewayError, MemberId};

use super::{DisplayedMember, Notice, Phase, SessionView};

/// Identifies one lookup; only the pending ticket may settle the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Lookup { ticket: Ticket, id: MemberId },
    ArmIdleTimer { generation: u64 },
    CancelIdleTimer,
    Notify(Notice),
    FocusInput,
}

#[derive(Debug, Default)]
pub struct SessionCore {
    input: String,
    pending: Option<Ticket>,
    record: Option<DisplayedMember>,
    next_ticket: u64,
    timer_generation: u64,
    armed: Option<u64>,
}

impl SessionCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.pending.is_some() {
            Phase::Resolving
        } else if self.record.is_some() {
            Phase::Displaying
        } else if !self.input.is_empty() {
            Phase::Collecting
        } else {
            Phase::Idle
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn record(&self) -> Option<&DisplayedMember> {
        self.record.as_ref()
    }

    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase(),
            input: self.input.clone(),
            record: self.record.clone(),
        }
    }

    /// Replace the input field content
    ///
    /// Non-digits are stripped and the value is cut at eight digits.
    /// Ignored while a lookup is pending.
    pub fn set_input(&mut self, raw: &str) -> Vec<Effect> {
        if self.pending.is_some() {
            tracing::debug!("Input ignored while a lookup is pending");
            return Vec::new();
        }

        self.input = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(MEMBER_ID_LEN)
            .collect();

        if self.input.len() < MEMBER_ID_LEN {
            return Vec::new();
        }

        let Ok(id) = MemberId::parse(&self.input) else {
            return Vec::new();
        };
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);
        tracing::debug!(dni = %id, ticket = ticket.0, "Identification complete, looking up");

        vec![Effect::Lookup { ticket, id }]
    }

    /// Append keystrokes to the current input
    pub fn type_keys(&mut self, keys: &str) -> Vec<Effect> {
        if self.pending.is_some() {
            tracing::debug!("Input ignored while a lookup is pending");
            return Vec::new();
        }
        let combined = format!("{}{}", self.input, keys);
        self.set_input(&combined)
    }

    /// Result of the lookup issued under `ticket`
    pub fn lookup_settled(
        &mut self,
        ticket: Ticket,
        result: Result<DisplayedMember, GatewayError>,
    ) -> Vec<Effect> {
        if self.pending != Some(ticket) {
            tracing::debug!(ticket = ticket.0, "Discarding stale lookup response");
            return Vec::new();
        }
        self.pending = None;
        self.input.clear();

        match result {
            Ok(displayed) => {
                self.record = Some(displayed);
                self.timer_generation += 1;
                self.armed = Some(self.timer_generation);
                vec![Effect::ArmIdleTimer {
                    generation: self.timer_generation,
                }]
            }
            Err(err) => {
                self.record = None;
                self.armed = None;
                vec![
                    Effect::CancelIdleTimer,
                    Effect::Notify(Notice::from(&err)),
                    Effect::FocusInput,
                ]
            }
        }
    }

    /// Idle timer fired for `generation`
    pub fn idle_expired(&mut self, generation: u64) -> Vec<Effect> {
        if self.armed != Some(generation) {
            tracing::debug!(generation, "Discarding stale idle expiry");
            return Vec::new();
        }
        self.armed = None;
        self.record = None;
        vec![Effect::Notify(Notice::expired()), Effect::FocusInput]
    }

    /// Operator closed the record
    ///
    /// A pending lookup is left alone and may still settle.
    pub fn dismiss(&mut self) -> Vec<Effect> {
        self.record = None;
        self.armed = None;
        vec![Effect::CancelIdleTimer, Effect::FocusInput]
    }

    /// Back to a blank screen; any pending lookup becomes stale
    pub fn reset(&mut self) -> Vec<Effect> {
        self.input.clear();
        self.pending = None;
        self.record = None;
        self.armed = None;
        vec![Effect::CancelIdleTimer, Effect::FocusInput]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NoticeKind;
    use chrono::NaiveDate;
    use shared::{MemberCreate, MembershipStatus, PlanType};

    fn displayed(dni: &str) -> DisplayedMember {
        let member = MemberCreate {
            id: MemberId::parse(dni).unwrap(),
            name: "Ana".into(),
            last_name: "Gómez".into(),
            email: None,
            phone: None,
            birth_date: None,
            plan_type: PlanType::Full,
            payment_due_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            medication: None,
            conditions: None,
            active: true,
        }
        .into_member();
        DisplayedMember {
            member,
            status: MembershipStatus::Current,
            check_ins_today: Vec::new(),
        }
    }

    fn lookup_ticket(effects: &[Effect]) -> Ticket {
        match effects {
            [Effect::Lookup { ticket, .. }] => *ticket,
            other => panic!("expected a single lookup, got {:?}", other),
        }
    }

    #[test]
    fn test_one_lookup_at_eighth_digit() {
        let mut core = SessionCore::new();
        for digit in "1234567".chars() {
            assert!(core.type_keys(&digit.to_string()).is_empty());
            assert_eq!(core.phase(), Phase::Collecting);
        }

        let effects = core.type_keys("8");
        assert_eq!(
            effects,
            vec![Effect::Lookup {
                ticket: Ticket(0),
                id: MemberId::parse("12345678").unwrap(),
            }]
        );
        assert_eq!(core.phase(), Phase::Resolving);

        // ninth digit while pending
        assert!(core.type_keys("9").is_empty());
        assert_eq!(core.input(), "12345678");
    }

    #[test]
    fn test_non_digits_stripped_and_capped() {
        let mut core = SessionCore::new();
        assert!(core.set_input("12.345-6a").is_empty());
        assert_eq!(core.input(), "123456");

        let effects = core.set_input("30.123.456 99");
        assert_eq!(lookup_ticket(&effects), Ticket(0));
        assert_eq!(core.input(), "30123456");
    }

    #[test]
    fn test_success_displays_and_arms_timer() {
        let mut core = SessionCore::new();
        let ticket = lookup_ticket(&core.set_input("30123456"));

        let effects = core.lookup_settled(ticket, Ok(displayed("30123456")));
        assert_eq!(effects, vec![Effect::ArmIdleTimer { generation: 1 }]);
        assert_eq!(core.phase(), Phase::Displaying);
        assert_eq!(core.input(), "");
    }

    #[test]
    fn test_failure_notifies_and_returns_to_idle() {
        let mut core = SessionCore::new();
        let id = MemberId::parse("30123456").unwrap();
        let ticket = lookup_ticket(&core.set_input(id.as_str()));

        let effects = core.lookup_settled(ticket, Err(GatewayError::NotFound(id)));
        assert_eq!(effects.len(), 3);
        assert_eq!(effects[0], Effect::CancelIdleTimer);
        assert!(matches!(&effects[1], Effect::Notify(n) if n.kind == NoticeKind::NotFound));
        assert_eq!(effects[2], Effect::FocusInput);
        assert_eq!(core.phase(), Phase::Idle);
        assert!(core.record().is_none());
    }

    #[test]
    fn test_new_identification_keeps_record_until_settled() {
        let mut core = SessionCore::new();
        let first = lookup_ticket(&core.set_input("30123456"));
        core.lookup_settled(first, Ok(displayed("30123456")));

        let second = lookup_ticket(&core.set_input("40111222"));
        assert_eq!(core.phase(), Phase::Resolving);
        assert_eq!(core.record().unwrap().member.id.as_str(), "30123456");

        let effects = core.lookup_settled(second, Ok(displayed("40111222")));
        assert_eq!(effects, vec![Effect::ArmIdleTimer { generation: 2 }]);
        assert_eq!(core.record().unwrap().member.id.as_str(), "40111222");
    }

    #[test]
    fn test_stale_response_after_reset_discarded() {
        let mut core = SessionCore::new();
        let ticket = lookup_ticket(&core.set_input("30123456"));

        core.reset();
        assert!(core.lookup_settled(ticket, Ok(displayed("30123456"))).is_empty());
        assert_eq!(core.phase(), Phase::Idle);
        assert!(core.record().is_none());
    }

    #[test]
    fn test_idle_expiry_once_and_stale_generations_ignored() {
        let mut core = SessionCore::new();
        let first = lookup_ticket(&core.set_input("30123456"));
        core.lookup_settled(first, Ok(displayed("30123456")));
        let second = lookup_ticket(&core.set_input("30123456"));
        core.lookup_settled(second, Ok(displayed("30123456")));

        // generation 1 was superseded by the re-arm
        assert!(core.idle_expired(1).is_empty());
        assert_eq!(core.phase(), Phase::Displaying);

        let effects = core.idle_expired(2);
        assert!(matches!(&effects[0], Effect::Notify(n) if n.kind == NoticeKind::Expired));
        assert_eq!(core.phase(), Phase::Idle);

        assert!(core.idle_expired(2).is_empty());
    }

    #[test]
    fn test_dismiss_prevents_expiry() {
        let mut core = SessionCore::new();
        let ticket = lookup_ticket(&core.set_input("30123456"));
        core.lookup_settled(ticket, Ok(displayed("30123456")));

        assert_eq!(core.dismiss(), vec![Effect::CancelIdleTimer, Effect::FocusInput]);
        assert!(core.idle_expired(1).is_empty());
        assert_eq!(core.phase(), Phase::Idle);
    }

    #[test]
    fn test_dismiss_keeps_pending_lookup() {
        let mut core = SessionCore::new();
        let ticket = lookup_ticket(&core.set_input("30123456"));
        core.dismiss();
        assert_eq!(core.phase(), Phase::Resolving);

        core.lookup_settled(ticket, Ok(displayed("30123456")));
        assert_eq!(core.phase(), Phase::Displaying);
    }
}
