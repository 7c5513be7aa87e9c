//! Core data types for the hydration reminder.
//!
//! This module defines the data structures used for:
//! - Reminder state
//! - Reminder configuration with validation
//! - The session history log
//! - Notification permission

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default reminder frequency in minutes.
pub const DEFAULT_FREQUENCY_MINUTES: u32 = 60;

/// Upper bound for the reminder frequency (one day).
pub const MAX_FREQUENCY_MINUTES: u32 = 24 * 60;

// ============================================================================
// ReminderState
// ============================================================================

/// Represents the current state of the reminder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    /// Reminder is not running
    #[default]
    Stopped,
    /// Counting down to the next reminder
    Started,
    /// The interval elapsed without a drink; reminders repeat every minute
    StartedOvertime,
}

impl ReminderState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderState::Stopped => "stopped",
            ReminderState::Started => "started",
            ReminderState::StartedOvertime => "started_overtime",
        }
    }

    /// Returns true if a countdown is running in this state.
    pub fn is_active(&self) -> bool {
        matches!(self, ReminderState::Started | ReminderState::StartedOvertime)
    }
}

impl fmt::Display for ReminderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ReminderConfig
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Frequency outside of 1..=MAX_FREQUENCY_MINUTES.
    #[error("リマインド間隔は1-1440分の範囲で指定してください (指定値: {0})")]
    InvalidFrequency(u32),
}

/// Configuration for the reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Reminder frequency in minutes
    pub frequency_minutes: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            frequency_minutes: DEFAULT_FREQUENCY_MINUTES,
        }
    }
}

impl ReminderConfig {
    /// Creates a new configuration with the specified frequency.
    pub fn with_frequency_minutes(mut self, minutes: u32) -> Self {
        self.frequency_minutes = minutes;
        self
    }

    /// Returns the reminder frequency in seconds.
    pub fn frequency_seconds(&self) -> u64 {
        u64::from(self.frequency_minutes) * 60
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frequency_minutes < 1 || self.frequency_minutes > MAX_FREQUENCY_MINUTES {
            return Err(ConfigError::InvalidFrequency(self.frequency_minutes));
        }
        Ok(())
    }
}

// ============================================================================
// History
// ============================================================================

/// User actions recorded in the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEvent {
    Start,
    Drink,
    Stop,
}

impl HistoryEvent {
    /// Returns the string representation of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryEvent::Start => "Start",
            HistoryEvent::Drink => "Drink",
            HistoryEvent::Stop => "Stop",
        }
    }
}

impl fmt::Display for HistoryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single history log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// What the user did
    pub event: HistoryEvent,
    /// When they did it
    pub time: DateTime<Local>,
}

/// Append-only log of user actions for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns a reference to it.
    pub fn push(&mut self, event: HistoryEvent, time: DateTime<Local>) -> &HistoryEntry {
        self.entries.push(HistoryEntry { event, time });
        &self.entries[self.entries.len() - 1]
    }

    /// Returns all entries in chronological order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the history and returns its entries.
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }
}

// ============================================================================
// Permission
// ============================================================================

/// Notification permission, modelled after the browser permission states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not decided yet
    #[default]
    Default,
}

impl Permission {
    /// Returns the string representation of the permission.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Granted => "granted",
            Permission::Denied => "denied",
            Permission::Default => "default",
        }
    }

    pub fn is_granted(&self) -> bool {
        *self == Permission::Granted
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// StatusReport
// ============================================================================

/// Snapshot of the reminder returned by the `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Current state
    pub state: ReminderState,
    /// Seconds until the next reminder, if a countdown has ticked
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    /// Notification permission at the time of the query
    pub permission: Permission,
    /// Reminder frequency in minutes
    #[serde(rename = "frequencyMinutes")]
    pub frequency_minutes: u32,
    /// Number of history entries
    #[serde(rename = "historyLength")]
    pub history_len: usize,
}

// ============================================================================
// Tests
// ============================================================================
