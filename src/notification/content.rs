//! Notification content construction.

use chrono::{DateTime, TimeZone};

/// Title used for every reminder notification.
pub const NOTIFICATION_TITLE: &str = "Water reminder";

/// Body shown once notification permission has been granted.
pub const PERMISSION_GRANTED_BODY: &str = "We are good to go~";

/// Fixed suffix of the reminder body.
pub const REMINDER_SUFFIX: &str = "Time to drink some water";

/// Formats a wall-clock time as `HH:MM AM/PM` (24-hour hour, then the meridiem).
pub fn format_clock_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M %p").to_string()
}

/// Builds the reminder body for the given wall-clock time.
///
/// ```
/// use chrono::{Local, TimeZone};
/// use hydrate::notification::reminder_body;
///
/// let time = Local.with_ymd_and_hms(2024, 5, 1, 14, 5, 0).unwrap();
/// assert_eq!(reminder_body(&time), "[14:05 PM] Time to drink some water");
/// ```
pub fn reminder_body<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("[{}] {}", format_clock_time(time), REMINDER_SUFFIX)
}
