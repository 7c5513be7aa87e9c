//! Notification sinks and reminder dispatch.
//!
//! The reminder talks to the outside world through the [`NotificationSink`]
//! trait. It includes:
//!
//! - A permission capability check, evaluated at send time
//! - An asynchronous, user-mediated permission request
//! - `show`/`dismiss` for individual notifications
//!
//! [`Notifier`] sits between the state machine and a sink. It owns the
//! handle of the notification currently on screen and dismisses it before a
//! new one is shown, so at most one reminder is visible at a time.
//!
//! Implementations:
//!
//! - [`DesktopSink`]: `notify-send` on Linux, `osascript` on macOS
//! - [`TerminalSink`]: prints a banner to stdout
//! - [`MockNotificationSink`]: records everything, for tests

mod content;
mod desktop;
pub mod error;
mod terminal;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::types::Permission;

pub use self::content::{
    format_clock_time, reminder_body, NOTIFICATION_TITLE, PERMISSION_GRANTED_BODY,
    REMINDER_SUFFIX,
};
pub use self::desktop::{DesktopSink, NotifierProgram};
pub use self::error::NotificationError;
pub use self::terminal::TerminalSink;

// ============================================================================
// NotificationHandle
// ============================================================================

/// Identifies a notification shown by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationHandle {
    id: Uuid,
}

impl NotificationHandle {
    /// Creates a handle with a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for NotificationHandle {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PermissionCell
// ============================================================================

/// Shared permission state.
///
/// Sinks hand a clone of the cell to the future returned by
/// [`NotificationSink::request_permission`], which records the user's answer
/// once it arrives.
#[derive(Debug, Clone, Default)]
pub struct PermissionCell {
    inner: Arc<Mutex<Permission>>,
}

impl PermissionCell {
    #[must_use]
    pub fn new(permission: Permission) -> Self {
        Self {
            inner: Arc::new(Mutex::new(permission)),
        }
    }

    #[must_use]
    pub fn get(&self) -> Permission {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, permission: Permission) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = permission;
    }
}

// ============================================================================
// NotificationSink
// ============================================================================

/// A pending permission request.
///
/// Owns everything it needs, so the caller can spawn it and keep the
/// countdown running while the user decides.
pub type PermissionRequest = Pin<Box<dyn Future<Output = Permission> + Send + 'static>>;

/// The external notification boundary.
pub trait NotificationSink {
    /// Returns the current permission. Must reflect revocations immediately.
    fn permission(&self) -> Permission;

    /// Returns true if notifications may be shown right now.
    fn is_permission_granted(&self) -> bool {
        self.permission().is_granted()
    }

    /// Asks the user for permission.
    fn request_permission(&self) -> PermissionRequest;

    /// Shows a notification.
    fn show(&self, title: &str, body: &str) -> Result<NotificationHandle, NotificationError>;

    /// Dismisses a previously shown notification.
    fn dismiss(&self, handle: &NotificationHandle);
}

// ============================================================================
// Notifier
// ============================================================================

/// Result of a [`Notifier::send`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The notification was shown.
    Sent,
    /// Permission was not granted, nothing was attempted.
    Suppressed,
    /// The sink failed; the error has been logged.
    Failed,
}

/// Dispatches reminders to a sink, keeping at most one notification alive.
#[derive(Debug)]
pub struct Notifier<S> {
    sink: S,
    current: Option<NotificationHandle>,
}

impl<S: NotificationSink> Notifier<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            current: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the handle of the notification currently on screen.
    pub fn current(&self) -> Option<&NotificationHandle> {
        self.current.as_ref()
    }

    /// Replaces the current notification with a new one.
    ///
    /// Permission is checked on every call; a revoked permission silently
    /// suppresses the send.
    pub fn send(&mut self, body: &str) -> SendOutcome {
        if !self.sink.is_permission_granted() {
            tracing::debug!(body, "通知許可がないため通知をスキップします");
            return SendOutcome::Suppressed;
        }

        if let Some(previous) = self.current.take() {
            self.sink.dismiss(&previous);
        }

        match self.sink.show(NOTIFICATION_TITLE, body) {
            Ok(handle) => {
                tracing::info!(id = %handle.id(), body, "通知を送信しました");
                self.current = Some(handle);
                SendOutcome::Sent
            }
            Err(e) => {
                tracing::warn!("{} ({})", e, e.suggestion());
                SendOutcome::Failed
            }
        }
    }
}

// ============================================================================
// MockNotificationSink
// ============================================================================

#[derive(Debug)]
struct MockState {
    shown: Mutex<Vec<(NotificationHandle, String, String)>>,
    dismissed: Mutex<Vec<NotificationHandle>>,
    permission: PermissionCell,
    request_answer: Mutex<Permission>,
    should_fail: Mutex<bool>,
}

/// In-memory sink for tests.
///
/// Clones share their recordings, so a test can keep one clone while the
/// other is moved into a state machine.
#[derive(Debug, Clone)]
pub struct MockNotificationSink {
    state: Arc<MockState>,
}

impl MockNotificationSink {
    /// Creates a mock with the given permission; requests answer `Granted`.
    #[must_use]
    pub fn new(permission: Permission) -> Self {
        Self {
            state: Arc::new(MockState {
                shown: Mutex::new(Vec::new()),
                dismissed: Mutex::new(Vec::new()),
                permission: PermissionCell::new(permission),
                request_answer: Mutex::new(Permission::Granted),
                should_fail: Mutex::new(false),
            }),
        }
    }

    /// Creates a mock that already has permission.
    #[must_use]
    pub fn granted() -> Self {
        Self::new(Permission::Granted)
    }

    pub fn set_permission(&self, permission: Permission) {
        self.state.permission.set(permission);
    }

    /// Sets the answer the next permission requests resolve to.
    pub fn set_request_answer(&self, permission: Permission) {
        *self.state.request_answer.lock().unwrap() = permission;
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.state.should_fail.lock().unwrap() = should_fail;
    }

    /// Returns the bodies of all shown notifications, oldest first.
    #[must_use]
    pub fn bodies(&self) -> Vec<String> {
        self.state
            .shown
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, body)| body.clone())
            .collect()
    }

    /// Returns `(title, body)` of all shown notifications.
    #[must_use]
    pub fn shown(&self) -> Vec<(String, String)> {
        self.state
            .shown
            .lock()
            .unwrap()
            .iter()
            .map(|(_, title, body)| (title.clone(), body.clone()))
            .collect()
    }

    #[must_use]
    pub fn handles(&self) -> Vec<NotificationHandle> {
        self.state
            .shown
            .lock()
            .unwrap()
            .iter()
            .map(|(handle, _, _)| handle.clone())
            .collect()
    }

    #[must_use]
    pub fn dismissed(&self) -> Vec<NotificationHandle> {
        self.state.dismissed.lock().unwrap().clone()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.state.shown.lock().unwrap().len()
    }
}

impl NotificationSink for MockNotificationSink {
    fn permission(&self) -> Permission {
        self.state.permission.get()
    }

    fn request_permission(&self) -> PermissionRequest {
        let cell = self.state.permission.clone();
        let answer = *self.state.request_answer.lock().unwrap();
        Box::pin(async move {
            cell.set(answer);
            answer
        })
    }

    fn show(&self, title: &str, body: &str) -> Result<NotificationHandle, NotificationError> {
        if *self.state.should_fail.lock().unwrap() {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        let handle = NotificationHandle::new();
        self.state
            .shown
            .lock()
            .unwrap()
            .push((handle.clone(), title.to_string(), body.to_string()));
        Ok(handle)
    }

    fn dismiss(&self, handle: &NotificationHandle) {
        self.state.dismissed.lock().unwrap().push(handle.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod notifier_tests {
        use super::*;

        #[test]
        fn test_send_with_permission() {
            let sink = MockNotificationSink::granted();
            let mut notifier = Notifier::new(sink.clone());

            assert_eq!(notifier.send("hello"), SendOutcome::Sent);

            assert_eq!(
                sink.shown(),
                vec![(NOTIFICATION_TITLE.to_string(), "hello".to_string())]
            );
            assert_eq!(notifier.current(), sink.handles().first());
        }

        #[test]
        fn test_send_without_permission_is_noop() {
            let sink = MockNotificationSink::new(Permission::Default);
            let mut notifier = Notifier::new(sink.clone());

            assert_eq!(notifier.send("hello"), SendOutcome::Suppressed);
            assert_eq!(sink.notification_count(), 0);
            assert!(notifier.current().is_none());
        }

        #[test]
        fn test_second_send_dismisses_first() {
            let sink = MockNotificationSink::granted();
            let mut notifier = Notifier::new(sink.clone());

            notifier.send("first");
            notifier.send("second");

            let handles = sink.handles();
            assert_eq!(handles.len(), 2);
            assert_eq!(sink.dismissed(), vec![handles[0].clone()]);
            assert_eq!(notifier.current(), Some(&handles[1]));
        }

        #[test]
        fn test_permission_checked_at_send_time() {
            let sink = MockNotificationSink::granted();
            let mut notifier = Notifier::new(sink.clone());

            assert_eq!(notifier.send("one"), SendOutcome::Sent);
            sink.set_permission(Permission::Denied);
            assert_eq!(notifier.send("two"), SendOutcome::Suppressed);

            assert_eq!(sink.bodies(), vec!["one".to_string()]);
            // a suppressed send leaves the visible notification alone
            assert!(sink.dismissed().is_empty());
        }

        #[test]
        fn test_failed_send_clears_current() {
            let sink = MockNotificationSink::granted();
            let mut notifier = Notifier::new(sink.clone());

            notifier.send("one");
            sink.set_should_fail(true);

            assert_eq!(notifier.send("two"), SendOutcome::Failed);
            assert!(notifier.current().is_none());
            assert_eq!(sink.dismissed().len(), 1);
        }
    }

    mod mock_sink_tests {
        use super::*;

        #[tokio::test]
        async fn test_request_permission_updates_capability() {
            let sink = MockNotificationSink::new(Permission::Default);
            assert!(!sink.is_permission_granted());

            let answer = sink.request_permission().await;

            assert_eq!(answer, Permission::Granted);
            assert!(sink.is_permission_granted());
        }

        #[tokio::test]
        async fn test_request_permission_denied() {
            let sink = MockNotificationSink::new(Permission::Default);
            sink.set_request_answer(Permission::Denied);

            assert_eq!(sink.request_permission().await, Permission::Denied);
            assert_eq!(sink.permission(), Permission::Denied);
        }

        #[test]
        fn test_clones_share_recordings() {
            let sink = MockNotificationSink::granted();
            let other = sink.clone();

            other.show("t", "b").unwrap();

            assert_eq!(sink.notification_count(), 1);
        }
    }

    #[test]
    fn test_permission_cell_shared_between_clones() {
        let cell = PermissionCell::default();
        let clone = cell.clone();

        clone.set(Permission::Granted);

        assert_eq!(cell.get(), Permission::Granted);
    }

    #[test]
    fn test_handles_are_unique() {
        assert_ne!(NotificationHandle::new(), NotificationHandle::new());
    }
}
