//! Terminal notifications.
//!
//! Prints a banner line to stdout. Useful over SSH or on machines without a
//! notification server.

use tracing::debug;

use super::{
    NotificationError, NotificationHandle, NotificationSink, PermissionCell, PermissionRequest,
};
use crate::types::Permission;

/// Shows notifications as banner lines on stdout.
#[derive(Debug, Clone, Default)]
pub struct TerminalSink {
    permission: PermissionCell,
}

impl TerminalSink {
    /// Creates a sink whose permission starts undecided.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the banner printed for a notification.
    #[must_use]
    pub fn render(title: &str, body: &str) -> String {
        format!("[{title}] {body}")
    }
}

impl NotificationSink for TerminalSink {
    fn permission(&self) -> Permission {
        self.permission.get()
    }

    fn request_permission(&self) -> PermissionRequest {
        let cell = self.permission.clone();
        Box::pin(async move {
            // The user asked for it from their own terminal.
            cell.set(Permission::Granted);
            Permission::Granted
        })
    }

    fn show(&self, title: &str, body: &str) -> Result<NotificationHandle, NotificationError> {
        if !self.is_permission_granted() {
            return Err(NotificationError::PermissionDenied);
        }
        println!("\r{}", Self::render(title, body));
        Ok(NotificationHandle::new())
    }

    fn dismiss(&self, handle: &NotificationHandle) {
        debug!(id = %handle.id(), "端末通知は閉じる必要がありません");
    }
}
