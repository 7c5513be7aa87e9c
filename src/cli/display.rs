//! Display utilities for the hydration reminder CLI.
//!
//! This module provides formatted output for:
//! - Reminder events (state changes, countdown, reminders)
//! - Status and history
//! - Help and error messages

use std::io::{self, Write};

use tokio::sync::mpsc;

use super::input::InputCommand;
use crate::reminder::{format_countdown, ReminderEvent};
use crate::types::{HistoryEntry, Permission, ReminderConfig, ReminderState, StatusReport};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Renders reminder events until the machine goes away.
    pub async fn render_events(mut events: mpsc::UnboundedReceiver<ReminderEvent>) {
        while let Some(event) = events.recv().await {
            Self::show_event(&event);
        }
    }

    /// Shows a single reminder event.
    pub fn show_event(event: &ReminderEvent) {
        match event {
            ReminderEvent::StartedTick { .. } | ReminderEvent::OvertimeTick { .. } => {
                if let Some(line) = Self::format_event(event) {
                    print!("\r{line}    ");
                    let _ = io::stdout().flush();
                }
            }
            _ => {
                if let Some(line) = Self::format_event(event) {
                    println!("\r{line}");
                }
            }
        }
    }

    /// Formats an event as a line of output.
    ///
    /// Returns `None` for events that are not shown.
    pub fn format_event(event: &ReminderEvent) -> Option<String> {
        match event {
            ReminderEvent::StateChanged { to, .. } => Some(match to {
                ReminderState::Started => "* カウントダウンを開始しました".to_string(),
                ReminderState::StartedOvertime => {
                    "! 時間です。水を飲んだら drink と入力してください".to_string()
                }
                ReminderState::Stopped => "[] リマインダーを停止しました".to_string(),
            }),
            ReminderEvent::StartedTick { remaining_seconds } => Some(format!(
                "次のリマインドまで {}",
                format_countdown(*remaining_seconds)
            )),
            ReminderEvent::OvertimeTick { remaining_seconds } => {
                Some(format!("超過中: 再通知まで {remaining_seconds}秒"))
            }
            ReminderEvent::ReminderSent { body } => Some(format!("~ {body}")),
            ReminderEvent::ReminderSuppressed => {
                Some("~ 通知できませんでした (permission で許可してください)".to_string())
            }
            ReminderEvent::PermissionChanged { permission } => {
                Some(format!("通知許可: {}", Self::permission_label(*permission)))
            }
            ReminderEvent::HistoryAppended { .. } => None,
        }
    }

    /// Shows the welcome banner.
    pub fn show_welcome(config: &ReminderConfig) {
        println!("水分補給リマインダー");
        println!("─────────────────────────────");
        println!("リマインド間隔: {}分", config.frequency_minutes);
        println!("help でコマンド一覧を表示します");
    }

    /// Shows the current status.
    pub fn show_status(status: &StatusReport) {
        println!("\r{}", Self::format_status(status));
    }

    pub fn format_status(status: &StatusReport) -> String {
        let mut lines = vec![
            "ステータス".to_string(),
            "─────────────────────────────".to_string(),
            format!("状態: {}", Self::state_label(status.state)),
        ];

        if let Some(remaining) = status.remaining_seconds {
            match status.state {
                ReminderState::Started => {
                    lines.push(format!("残り時間: {}", format_countdown(remaining)))
                }
                ReminderState::StartedOvertime => {
                    lines.push(format!("再通知まで: {remaining}秒"))
                }
                ReminderState::Stopped => {}
            }
        }

        lines.push(format!("リマインド間隔: {}分", status.frequency_minutes));
        lines.push(format!(
            "通知許可: {}",
            Self::permission_label(status.permission)
        ));
        lines.push(format!("履歴: {}件", status.history_len));
        lines.join("\n")
    }

    /// Shows the history log.
    pub fn show_history(entries: &[HistoryEntry]) {
        println!("\r{}", Self::format_history(entries));
    }

    pub fn format_history(entries: &[HistoryEntry]) -> String {
        if entries.is_empty() {
            return "履歴はありません".to_string();
        }

        entries
            .iter()
            .map(|entry| format!("{}  {}", entry.time.format("%H:%M:%S"), entry.event))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Shows the list of session commands.
    pub fn show_help() {
        println!("\r{}", Self::format_help());
    }

    pub fn format_help() -> String {
        InputCommand::ALL
            .iter()
            .map(|command| {
                let names = std::iter::once(command.as_command())
                    .chain(command.aliases().iter().copied())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("  {names:<20} {}", command.description())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    fn state_label(state: ReminderState) -> &'static str {
        match state {
            ReminderState::Stopped => "停止中",
            ReminderState::Started => "カウントダウン中",
            ReminderState::StartedOvertime => "超過中",
        }
    }

    fn permission_label(permission: Permission) -> &'static str {
        match permission {
            Permission::Granted => "許可",
            Permission::Denied => "拒否",
            Permission::Default => "未設定",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
