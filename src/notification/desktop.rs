//! Desktop notifications through the platform notifier program.
//!
//! - Linux: `notify-send` (libnotify)
//! - macOS: `osascript -e 'display notification ...'`
//!
//! "Permission" on the desktop means the notifier program exists. It is
//! probed when permission is requested and the answer is kept in a
//! [`PermissionCell`], so a denied probe suppresses every later send.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{
    NotificationError, NotificationHandle, NotificationSink, PermissionCell, PermissionRequest,
};
use crate::types::Permission;

/// Application name passed to the notification server.
const APP_NAME: &str = "hydrate";

/// libnotify hint that makes the server replace our previous bubble.
const REPLACE_HINT: &str = "string:x-canonical-private-synchronous:hydrate";

/// The external program used to show notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierProgram {
    NotifySend,
    Osascript,
}

impl NotifierProgram {
    /// Returns the notifier program for the current platform.
    #[must_use]
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            NotifierProgram::Osascript
        } else {
            NotifierProgram::NotifySend
        }
    }

    #[must_use]
    pub fn program_name(&self) -> &'static str {
        match self {
            NotifierProgram::NotifySend => "notify-send",
            NotifierProgram::Osascript => "osascript",
        }
    }

    /// Searches `PATH` for the program.
    #[must_use]
    pub fn locate(&self) -> Option<PathBuf> {
        let paths = env::var_os("PATH")?;
        env::split_paths(&paths)
            .map(|dir| dir.join(self.program_name()))
            .find(|candidate| is_executable(candidate))
    }

    /// Returns the arguments that show a notification with this program.
    #[must_use]
    pub fn arguments(&self, title: &str, body: &str) -> Vec<String> {
        match self {
            NotifierProgram::NotifySend => vec![
                format!("--app-name={APP_NAME}"),
                format!("--hint={REPLACE_HINT}"),
                title.to_string(),
                body.to_string(),
            ],
            NotifierProgram::Osascript => vec![
                "-e".to_string(),
                format!(
                    "display notification \"{}\" with title \"{}\"",
                    escape_applescript(body),
                    escape_applescript(title)
                ),
            ],
        }
    }
}

fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Escapes a string for use inside an AppleScript string literal.
fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Shows notifications through the desktop notification server.
#[derive(Debug, Clone)]
pub struct DesktopSink {
    program: NotifierProgram,
    permission: PermissionCell,
}

impl DesktopSink {
    /// Creates a sink for the current platform. Permission starts undecided.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(NotifierProgram::detect())
    }

    #[must_use]
    pub fn with_program(program: NotifierProgram) -> Self {
        Self {
            program,
            permission: PermissionCell::default(),
        }
    }

    #[must_use]
    pub fn program(&self) -> NotifierProgram {
        self.program
    }
}

impl Default for DesktopSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for DesktopSink {
    fn permission(&self) -> Permission {
        self.permission.get()
    }

    fn request_permission(&self) -> PermissionRequest {
        let program = self.program;
        let cell = self.permission.clone();

        Box::pin(async move {
            let located = tokio::task::spawn_blocking(move || program.locate())
                .await
                .ok()
                .flatten();

            let permission = match located {
                Some(path) => {
                    info!(path = %path.display(), "通知プログラムを検出しました");
                    Permission::Granted
                }
                None => {
                    let err = NotificationError::NotifierNotFound(program.program_name().into());
                    warn!("{} ({})", err, err.suggestion());
                    Permission::Denied
                }
            };

            cell.set(permission);
            permission
        })
    }

    fn show(&self, title: &str, body: &str) -> Result<NotificationHandle, NotificationError> {
        if !self.is_permission_granted() {
            return Err(NotificationError::PermissionDenied);
        }

        let _child = Command::new(self.program.program_name())
            .args(self.program.arguments(title, body))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        Ok(NotificationHandle::new())
    }

    fn dismiss(&self, handle: &NotificationHandle) {
        // Neither notifier can close a bubble; notify-send replaces it through REPLACE_HINT.
        debug!(id = %handle.id(), "デスクトップ通知は次の通知で置き換えられます");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_matches_platform() {
        let program = NotifierProgram::detect();
        if cfg!(target_os = "macos") {
            assert_eq!(program, NotifierProgram::Osascript);
        } else {
            assert_eq!(program, NotifierProgram::NotifySend);
        }
    }

    #[test]
    fn test_notify_send_arguments() {
        let args = NotifierProgram::NotifySend.arguments("Water reminder", "drink");
        assert_eq!(
            args,
            vec![
                "--app-name=hydrate".to_string(),
                format!("--hint={REPLACE_HINT}"),
                "Water reminder".to_string(),
                "drink".to_string(),
            ]
        );
    }

    #[test]
    fn test_osascript_arguments_escape_quotes() {
        let args = NotifierProgram::Osascript.arguments("Title", "say \"hi\"");
        assert_eq!(args[0], "-e");
        assert_eq!(
            args[1],
            "display notification \"say \\\"hi\\\"\" with title \"Title\""
        );
    }

    #[test]
    fn test_escape_applescript_backslash() {
        assert_eq!(escape_applescript(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_show_without_permission_fails() {
        let sink = DesktopSink::new();
        assert_eq!(sink.permission(), Permission::Default);

        let result = sink.show("t", "b");

        assert_eq!(result, Err(NotificationError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_request_permission_records_answer() {
        let sink = DesktopSink::new();

        let answer = sink.request_permission().await;

        // Depends on the host; the answer must be decided and stored either way.
        assert_ne!(answer, Permission::Default);
        assert_eq!(sink.permission(), answer);
    }
}
