//! Reminder state machine.
//!
//! This module provides the core reminder logic:
//! - State transitions (Stopped → Started → StartedOvertime)
//! - Countdown derivation from clock observations
//! - Reminder dispatch at zero-crossings
//! - The session history log
//!
//! The machine never sleeps. Whoever drives it (see [`Session`]) observes
//! the clock for the active [`Subscription`] and feeds ticks back through
//! [`ReminderMachine::on_tick`]. Every transition into an active state
//! creates a new subscription, which invalidates the previous one: ticks
//! carrying an old [`SubscriptionId`] are ignored.
//!
//! [`Session`]: super::Session

use std::fmt;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::notification::{
    reminder_body, NotificationSink, Notifier, PermissionRequest, SendOutcome,
    PERMISSION_GRANTED_BODY,
};
use crate::types::{
    History, HistoryEntry, HistoryEvent, Permission, ReminderConfig, ReminderState, StatusReport,
};

/// Length of one overtime reminder cycle in seconds.
pub const OVERTIME_CYCLE_SECONDS: u64 = 60;

// ============================================================================
// ReminderEvent
// ============================================================================

/// Events published by the state machine for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderEvent {
    /// The state cell changed (also published for same-state transitions)
    StateChanged {
        from: ReminderState,
        to: ReminderState,
    },
    /// Started countdown tick
    StartedTick {
        /// Seconds until the reminder
        remaining_seconds: u64,
    },
    /// Overtime countdown tick
    OvertimeTick {
        /// Seconds until the next overtime reminder
        remaining_seconds: u64,
    },
    /// A reminder notification was shown
    ReminderSent { body: String },
    /// A reminder was due but could not be shown
    ReminderSuppressed,
    /// The user answered a permission request
    PermissionChanged { permission: Permission },
    /// A user action was recorded
    HistoryAppended { entry: HistoryEntry },
}

// ============================================================================
// Subscription
// ============================================================================

/// Token identifying one countdown derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a subscription turns elapsed seconds into a countdown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Counts down once from `from_seconds` to 0
    Started { from_seconds: u64 },
    /// Repeats 59 → 0 forever
    Overtime,
}

impl Countdown {
    /// Returns the countdown value for `elapsed`, or `None` once the
    /// countdown would go negative.
    pub fn value(&self, elapsed: u64) -> Option<u64> {
        match self {
            Countdown::Started { from_seconds } => from_seconds.checked_sub(elapsed),
            Countdown::Overtime => {
                Some(OVERTIME_CYCLE_SECONDS - 1 - (elapsed % OVERTIME_CYCLE_SECONDS))
            }
        }
    }
}

/// The live countdown for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    countdown: Countdown,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }
}

/// Formats a countdown as `MM:SS`.
///
/// ```
/// use hydrate::reminder::format_countdown;
///
/// assert_eq!(format_countdown(125), "02:05");
/// assert_eq!(format_countdown(0), "00:00");
/// ```
pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

// ============================================================================
// ReminderMachine
// ============================================================================

/// Source of wall-clock time for history entries and reminder messages.
pub type WallClock = Box<dyn Fn() -> DateTime<Local> + Send>;

/// The reminder state machine.
pub struct ReminderMachine<S> {
    config: ReminderConfig,
    state: ReminderState,
    history: History,
    notifier: Notifier<S>,
    subscription: Option<Subscription>,
    next_subscription: u64,
    /// Last value of the active countdown
    remaining: Option<u64>,
    event_tx: mpsc::UnboundedSender<ReminderEvent>,
    now: WallClock,
}

impl<S: NotificationSink> ReminderMachine<S> {
    /// Creates a stopped machine.
    pub fn new(
        config: ReminderConfig,
        sink: S,
        event_tx: mpsc::UnboundedSender<ReminderEvent>,
    ) -> Self {
        Self {
            config,
            state: ReminderState::Stopped,
            history: History::new(),
            notifier: Notifier::new(sink),
            subscription: None,
            next_subscription: 0,
            remaining: None,
            event_tx,
            now: Box::new(Local::now),
        }
    }

    /// Replaces the wall clock used for timestamps.
    pub fn with_wall_clock(mut self, now: impl Fn() -> DateTime<Local> + Send + 'static) -> Self {
        self.now = Box::new(now);
        self
    }

    // ------------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------------

    /// Starts the reminder from any state.
    pub fn start(&mut self) {
        self.record(HistoryEvent::Start);
        self.transition(ReminderState::Started);
    }

    /// Acknowledges a drink; restarts the countdown from the full interval.
    pub fn drink(&mut self) {
        self.record(HistoryEvent::Drink);
        self.transition(ReminderState::Started);
    }

    /// Stops the reminder from any state, cancelling every countdown.
    pub fn stop(&mut self) {
        self.record(HistoryEvent::Stop);
        self.transition(ReminderState::Stopped);
    }

    /// Asks the sink for notification permission.
    ///
    /// The request does not borrow the machine. Feed its answer back through
    /// [`permission_resolved`](Self::permission_resolved).
    pub fn request_permission(&self) -> PermissionRequest {
        info!("通知許可をリクエストします");
        self.notifier.sink().request_permission()
    }

    /// Handles the answer to a permission request.
    pub fn permission_resolved(&mut self, permission: Permission) {
        info!(%permission, "通知許可の結果を受信しました");
        self.emit(ReminderEvent::PermissionChanged { permission });

        if permission.is_granted() {
            self.notifier.send(PERMISSION_GRANTED_BODY);
        }
    }

    // ------------------------------------------------------------------------
    // Clock input
    // ------------------------------------------------------------------------

    /// Feeds a clock tick for subscription `id`.
    ///
    /// Returns the derived countdown value, or `None` if the tick was stale
    /// or past the end of the countdown.
    pub fn on_tick(&mut self, id: SubscriptionId, elapsed: u64) -> Option<u64> {
        let subscription = match self.subscription {
            Some(subscription) if subscription.id == id => subscription,
            _ => {
                trace!(%id, elapsed, "古いサブスクリプションのティックを破棄しました");
                return None;
            }
        };

        let remaining = subscription.countdown.value(elapsed)?;
        self.remaining = Some(remaining);

        match subscription.countdown {
            Countdown::Started { .. } => {
                self.emit(ReminderEvent::StartedTick {
                    remaining_seconds: remaining,
                });
                if remaining == 0 {
                    self.remind();
                    self.transition(ReminderState::StartedOvertime);
                }
            }
            Countdown::Overtime => {
                self.emit(ReminderEvent::OvertimeTick {
                    remaining_seconds: remaining,
                });
                if remaining == 0 {
                    self.remind();
                }
            }
        }

        Some(remaining)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn state(&self) -> ReminderState {
        self.state
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the active countdown, if any.
    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription
    }

    pub fn permission(&self) -> Permission {
        self.notifier.sink().permission()
    }

    pub fn notifier(&self) -> &Notifier<S> {
        &self.notifier
    }

    /// Returns a snapshot for the `status` command.
    pub fn status(&self) -> StatusReport {
        StatusReport {
            state: self.state,
            remaining_seconds: self.remaining,
            permission: self.permission(),
            frequency_minutes: self.config.frequency_minutes,
            history_len: self.history.len(),
        }
    }

    /// Consumes the machine, returning the session history.
    pub fn into_history(self) -> History {
        self.history
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Updates the state cell, then replaces the subscription.
    fn transition(&mut self, to: ReminderState) {
        let from = self.state;
        self.state = to;

        self.subscription = match to {
            ReminderState::Stopped => None,
            ReminderState::Started => Some(self.subscribe(Countdown::Started {
                from_seconds: self.config.frequency_seconds(),
            })),
            ReminderState::StartedOvertime => Some(self.subscribe(Countdown::Overtime)),
        };
        self.remaining = None;

        info!(%from, %to, "状態が変化しました");
        self.emit(ReminderEvent::StateChanged { from, to });
    }

    fn subscribe(&mut self, countdown: Countdown) -> Subscription {
        self.next_subscription += 1;
        let subscription = Subscription {
            id: SubscriptionId(self.next_subscription),
            countdown,
        };
        debug!(id = %subscription.id, ?countdown, "カウントダウンを開始しました");
        subscription
    }

    fn record(&mut self, event: HistoryEvent) {
        let time = (self.now)();
        let entry = self.history.push(event, time).clone();
        self.emit(ReminderEvent::HistoryAppended { entry });
    }

    fn remind(&mut self) {
        let body = reminder_body(&(self.now)());
        match self.notifier.send(&body) {
            SendOutcome::Sent => self.emit(ReminderEvent::ReminderSent { body }),
            SendOutcome::Suppressed | SendOutcome::Failed => {
                self.emit(ReminderEvent::ReminderSuppressed)
            }
        }
    }

    fn emit(&self, event: ReminderEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("イベント受信側がありません");
        }
    }
}

impl<S> fmt::Debug for ReminderMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderMachine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("history_len", &self.history.len())
            .field("subscription", &self.subscription)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
