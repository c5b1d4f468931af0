//! Gym front desk - membership-state and ledger engine
//!
//! # Overview
//!
//! - **Civil clock** (`clock`): single timezone for every "today"
//! - **Status** (`status`): due date → current / overdue
//! - **Ledger** (`ledger`): renewal vs ledger-only payments
//! - **Attendance** (`attendance`): day / week / month aggregates
//! - **Session** (`session`): kiosk identification with idle timeout
//! - **Directory** (`directory`, `intake`, `roster`): member records
//!
//! # Module layout
//!
//! ```text
//! front-desk/src/
//! ├── clock.rs       # Clock, CivilCalendar, date formatting
//! ├── status.rs      # status resolver
//! ├── ledger.rs      # payment rules + PaymentLedger
//! ├── attendance.rs  # aggregation, month grid
//! ├── session/       # identification state machine + actor
//! ├── store.rs       # in-memory MemberGateway
//! ├── intake.rs      # form validation
//! ├── directory.rs   # register / edit / remove
//! ├── roster.rs      # listing helpers
//! ├── in_flight.rs   # duplicate-submission guard
//! ├── config.rs      # environment configuration
//! └── logger.rs      # tracing setup
//! ```

pub mod attendance;
pub mod clock;
pub mod config;
pub mod directory;
pub mod in_flight;
pub mod intake;
pub mod ledger;
pub mod logger;
pub mod roster;
pub mod session;
pub mod status;
pub mod store;

pub use clock::{CivilCalendar, Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigError};
pub use directory::{DirectoryError, MemberDirectory};
pub use in_flight::InFlight;
pub use ledger::{LedgerError, PaymentLedger};
pub use logger::init_logger_with_file;
pub use roster::Roster;
pub use session::{KioskHandle, KioskSession, SessionConfig, SessionView};
pub use store::MemoryGateway;
