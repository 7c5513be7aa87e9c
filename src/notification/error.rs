//! Notification system error types.
//!
//! These errors stay inside the notification boundary: the [`Notifier`]
//! logs them and carries on, so the reminder state machine never sees them.
//!
//! [`Notifier`]: super::Notifier

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Notification permission has not been granted.
    #[error("通知許可がありません")]
    PermissionDenied,

    /// The desktop notifier program could not be found.
    #[error("通知プログラム '{0}' が見つかりません")]
    NotifierNotFound(String),

    /// Failed to send a notification.
    #[error("通知の送信に失敗しました: {0}")]
    SendFailed(String),
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::NotifierNotFound(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "`permission` コマンドで通知を許可してください",
            Self::NotifierNotFound(_) => {
                "notify-send (libnotify) をインストールするか --sink terminal を指定してください"
            }
            Self::SendFailed(_) => "通知デーモンが起動しているか確認してください",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotificationError::PermissionDenied;
        assert_eq!(err.to_string(), "通知許可がありません");

        let err = NotificationError::SendFailed("broken pipe".to_string());
        assert!(err.to_string().contains("broken pipe"));
    }

    #[test]
    fn test_is_permission_error() {
        assert!(NotificationError::PermissionDenied.is_permission_error());
        assert!(NotificationError::NotifierNotFound("notify-send".into()).is_permission_error());
        assert!(!NotificationError::SendFailed("x".into()).is_permission_error());
    }

    #[test]
    fn test_suggestion() {
        let err = NotificationError::NotifierNotFound("notify-send".into());
        assert!(err.suggestion().contains("--sink terminal"));
    }
}
