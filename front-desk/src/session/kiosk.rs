//! Session actor
//!
//! `KioskSession` owns the [`SessionCore`], the idle timer and the refocus
//! ticker, and processes one event at a time. Lookups run as separate
//! tasks and report back through the event channel; in-flight lookups are
//! never cancelled, their late answers are dropped by ticket.

use std::sync::Arc;

use shared::{GatewayError, Member, MemberGateway, MemberId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::core::{Effect, SessionCore, Ticket};
use super::timer::{IdleTimer, RefocusTicker};
use super::{DisplayMode, DisplayedMember, FocusTarget, Notice, Phase, SessionConfig, SessionView};
use crate::clock::CivilCalendar;

/// Operator input
#[derive(Debug)]
enum Command {
    TypeKeys(String),
    SetInput(String),
    Dismiss,
    Reset,
}

/// Completions reported back to the actor
#[derive(Debug)]
enum Event {
    LookupSettled {
        ticket: Ticket,
        result: Result<Member, GatewayError>,
    },
    IdleExpired {
        generation: u64,
    },
}

pub struct KioskSession {
    core: SessionCore,
    config: SessionConfig,
    gateway: Arc<dyn MemberGateway>,
    calendar: CivilCalendar,
    focus: Arc<dyn FocusTarget>,
    idle: IdleTimer,
    refocus: Option<RefocusTicker>,
    view_tx: watch::Sender<SessionView>,
    notice_tx: mpsc::UnboundedSender<Notice>,
    event_tx: mpsc::UnboundedSender<Event>,
}

impl KioskSession {
    /// Start the session actor on the current runtime
    ///
    /// Returns the control handle and the stream of transient notices.
    pub fn spawn(
        gateway: Arc<dyn MemberGateway>,
        calendar: CivilCalendar,
        config: SessionConfig,
        focus: Arc<dyn FocusTarget>,
    ) -> (KioskHandle, mpsc::UnboundedReceiver<Notice>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(SessionView::default());
        let shutdown = CancellationToken::new();

        let session = Self {
            core: SessionCore::new(),
            config,
            gateway,
            calendar,
            focus,
            idle: IdleTimer::new(),
            refocus: None,
            view_tx,
            notice_tx,
            event_tx,
        };
        let task = tokio::spawn(session.run(cmd_rx, event_rx, shutdown.clone()));

        let handle = KioskHandle {
            cmd_tx,
            view_rx,
            shutdown,
            task: Some(task),
        };
        (handle, notice_rx)
    }

    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        mut event_rx: mpsc::UnboundedReceiver<Event>,
        shutdown: CancellationToken,
    ) {
        tracing::info!(mode = ?self.config.display_mode, "Kiosk session started");
        self.focus.focus_input();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Kiosk session received shutdown signal");
                    break;
                }
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        tracing::info!("Kiosk handle dropped, session stopping");
                        break;
                    };
                    let effects = match cmd {
                        Command::TypeKeys(keys) => self.core.type_keys(&keys),
                        Command::SetInput(raw) => self.core.set_input(&raw),
                        Command::Dismiss => self.core.dismiss(),
                        Command::Reset => self.core.reset(),
                    };
                    self.apply(effects);
                }
                Some(event) = event_rx.recv() => {
                    let effects = match event {
                        Event::LookupSettled { ticket, result } => {
                            let result = result.map(|m| DisplayedMember::new(m, &self.calendar));
                            self.core.lookup_settled(ticket, result)
                        }
                        Event::IdleExpired { generation } => {
                            let effects = self.core.idle_expired(generation);
                            if !effects.is_empty() {
                                tracing::info!("Idle timeout, record cleared");
                            }
                            effects
                        }
                    };
                    self.apply(effects);
                }
            }
        }

        self.idle.cancel();
        self.refocus = None;
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Lookup { ticket, id } => self.spawn_lookup(ticket, id),
                Effect::ArmIdleTimer { generation } => {
                    let events = self.event_tx.clone();
                    self.idle.arm(self.config.idle_timeout, move || {
                        let _ = events.send(Event::IdleExpired { generation });
                    });
                }
                Effect::CancelIdleTimer => self.idle.cancel(),
                Effect::Notify(notice) => {
                    tracing::debug!(kind = ?notice.kind, "{}", notice.message);
                    let _ = self.notice_tx.send(notice);
                }
                Effect::FocusInput => self.focus.focus_input(),
            }
        }

        self.sync_refocus();
        self.view_tx.send_replace(self.core.view());
    }

    /// Refocus runs only while a record is shown on a kiosk screen
    fn sync_refocus(&mut self) {
        let wanted = self.config.display_mode == DisplayMode::Kiosk
            && self.core.phase() == Phase::Displaying;
        match (wanted, self.refocus.is_some()) {
            (true, false) => {
                self.refocus = Some(RefocusTicker::start(
                    self.config.refocus_interval,
                    self.focus.clone(),
                ));
            }
            (false, true) => self.refocus = None,
            _ => {}
        }
    }

    fn spawn_lookup(&self, ticket: Ticket, id: MemberId) {
        let gateway = self.gateway.clone();
        let events = self.event_tx.clone();
        let check_in = self.config.check_in_on_identify;

        tokio::spawn(async move {
            let result = lookup(gateway.as_ref(), &id, check_in).await;
            match &result {
                Ok(member) => {
                    tracing::info!(dni = %id, name = %member.full_name(), "Member identified")
                }
                Err(e) => tracing::warn!(dni = %id, error = %e, "Identification failed"),
            }
            let _ = events.send(Event::LookupSettled { ticket, result });
        });
    }
}

async fn lookup(
    gateway: &dyn MemberGateway,
    id: &MemberId,
    check_in: bool,
) -> Result<Member, GatewayError> {
    if check_in {
        gateway.record_attendance(id).await?;
    }
    gateway.find_by_id(id).await
}

/// Control handle for a running [`KioskSession`]
///
/// Dropping the handle stops the session.
pub struct KioskHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    view_rx: watch::Receiver<SessionView>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl KioskHandle {
    /// Keystrokes appended to the input field
    pub fn type_keys(&self, keys: impl Into<String>) {
        self.send(Command::TypeKeys(keys.into()));
    }

    /// Whole input field content (paste / scanner burst)
    pub fn set_input(&self, raw: impl Into<String>) {
        self.send(Command::SetInput(raw.into()));
    }

    pub fn dismiss(&self) {
        self.send(Command::Dismiss);
    }

    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    /// Latest published view
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Stop the session and wait for the actor to finish
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::error!("Kiosk session task failed: {}", e);
        }
    }

    fn send(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!("Kiosk session is not running");
        }
    }
}

impl Drop for KioskHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
