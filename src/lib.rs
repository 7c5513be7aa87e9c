//! Hydration Reminder Library
//!
//! This library provides the core functionality for the hydrate CLI.
//! It includes:
//! - Reminder state machine with countdown and overtime reminders
//! - Session event loop driven by a periodic clock
//! - Notification sinks (desktop, terminal, mock) with permission handling
//! - CLI command parsing and display utilities
//! - Type definitions for configuration, history and state

pub mod cli;
pub mod notification;
pub mod reminder;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    ConfigError, History, HistoryEntry, HistoryEvent, Permission, ReminderConfig, ReminderState,
    StatusReport,
};

pub use notification::{
    DesktopSink, MockNotificationSink, NotificationError, NotificationHandle, NotificationSink,
    Notifier, TerminalSink,
};

pub use reminder::{Clock, ReminderEvent, ReminderMachine, Session, SessionHandle};
