//! Reminder core.
//!
//! This module contains the reminder functionality:
//! - `clock`: elapsed-seconds clock source
//! - `machine`: state machine with countdown derivation and reminder dispatch
//! - `session`: single-task event loop driving the machine

pub mod clock;
pub mod machine;
pub mod session;

pub use clock::{Clock, Observation};
pub use machine::{
    format_countdown, Countdown, ReminderEvent, ReminderMachine, Subscription, SubscriptionId,
    OVERTIME_CYCLE_SECONDS,
};
pub use session::{Session, SessionCommand, SessionHandle};
