//! Kiosk identification session
//!
//! A person types (or scans) an 8-digit DNI; the session looks the member
//! up, shows their standing and clears itself after a period of
//! inactivity.
//!
//! # Structure
//!
//! ```text
//! session/
//! ├── core.rs    # SessionCore: pure state machine, returns Effects
//! ├── timer.rs   # IdleTimer / RefocusTicker: owned, cancellable timers
//! └── kiosk.rs   # KioskSession actor + KioskHandle
//! ```
//!
//! Phases: `Idle` → `Collecting` → `Resolving` → `Displaying` → `Idle`.

mod core;
mod kiosk;
mod timer;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shared::{AppError, GatewayError, Member, MembershipStatus};

use crate::attendance;
use crate::clock::CivilCalendar;

pub use self::core::{Effect, SessionCore, Ticket};
pub use kiosk::{KioskHandle, KioskSession};
pub use timer::{IdleTimer, RefocusTicker};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// 1-7 digits typed
    Collecting,
    /// 8 digits typed, lookup in flight
    Resolving,
    /// A member record is on screen
    Displaying,
}

/// How the screen is operated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Unattended self-service screen, input kept focused for the scanner
    #[default]
    Kiosk,
    /// Staff-operated desk
    Staff,
}

impl FromStr for DisplayMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kiosk" => Ok(DisplayMode::Kiosk),
            "staff" => Ok(DisplayMode::Staff),
            other => Err(AppError::invalid_format(
                "display_mode",
                format!("Unknown display mode: {}", other),
            )),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Time a record stays on screen
    pub idle_timeout: Duration,
    /// Input refocus period while a record is shown in kiosk mode
    pub refocus_interval: Duration,
    pub display_mode: DisplayMode,
    /// Record a check-in before fetching the member
    pub check_in_on_identify: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            refocus_interval: Duration::from_millis(2000),
            display_mode: DisplayMode::Kiosk,
            check_in_on_identify: true,
        }
    }
}

/// Record shown after a successful identification
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedMember {
    pub member: Member,
    pub status: MembershipStatus,
    pub check_ins_today: Vec<DateTime<Utc>>,
}

impl DisplayedMember {
    pub fn new(member: Member, calendar: &CivilCalendar) -> Self {
        let status = calendar.status_of(member.payment_due_date);
        let check_ins_today =
            attendance::aggregate_by_day(&member.attendance_log, calendar.today(), calendar.tz());
        Self {
            member,
            status,
            check_ins_today,
        }
    }
}

/// Snapshot published after every session step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionView {
    pub phase: Phase,
    pub input: String,
    pub record: Option<DisplayedMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    NotFound,
    Unavailable,
    Rejected,
    /// Record cleared by the idle timer
    Expired,
}

/// Transient message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn expired() -> Self {
        Self {
            kind: NoticeKind::Expired,
            message: "Sesión finalizada por inactividad".to_string(),
        }
    }
}

impl From<&GatewayError> for Notice {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::NotFound(_) => Self {
                kind: NoticeKind::NotFound,
                message: "Estudiante no encontrado".to_string(),
            },
            GatewayError::Transport(_) => Self {
                kind: NoticeKind::Unavailable,
                message: "Error al conectar con el servidor".to_string(),
            },
            GatewayError::AlreadyExists(id) => Self {
                kind: NoticeKind::Rejected,
                message: format!("Ya existe un alumno con DNI {}", id),
            },
            GatewayError::InvalidAmount(msg) | GatewayError::Rejected(msg) => Self {
                kind: NoticeKind::Rejected,
                message: msg.clone(),
            },
        }
    }
}

/// Whatever holds the keyboard focus for the DNI input
pub trait FocusTarget: Send + Sync + 'static {
    fn focus_input(&self);
}

impl<F> FocusTarget for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn focus_input(&self) {
        self()
    }
}
