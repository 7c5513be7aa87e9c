//! In-session line commands.
//!
//! The interactive session reads one command per line from stdin and maps
//! it to an action on the session.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Commands typed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Start,
    Drink,
    Stop,
    /// Ask for notification permission
    Permission,
    Status,
    History,
    Help,
    Quit,
}

impl InputCommand {
    /// All commands in the order they are listed in the help text.
    pub const ALL: [InputCommand; 8] = [
        InputCommand::Start,
        InputCommand::Drink,
        InputCommand::Stop,
        InputCommand::Permission,
        InputCommand::Status,
        InputCommand::History,
        InputCommand::Help,
        InputCommand::Quit,
    ];

    /// Returns the canonical command name.
    pub fn as_command(&self) -> &'static str {
        match self {
            InputCommand::Start => "start",
            InputCommand::Drink => "drink",
            InputCommand::Stop => "stop",
            InputCommand::Permission => "permission",
            InputCommand::Status => "status",
            InputCommand::History => "history",
            InputCommand::Help => "help",
            InputCommand::Quit => "quit",
        }
    }

    /// Returns the short aliases accepted for this command.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            InputCommand::Start => &["s"],
            InputCommand::Drink => &["d"],
            InputCommand::Stop => &["x"],
            InputCommand::Permission => &["p"],
            InputCommand::Status => &["st"],
            InputCommand::History => &["h"],
            InputCommand::Help => &["?"],
            InputCommand::Quit => &["q", "exit"],
        }
    }

    /// Returns a human-readable description of this command.
    pub fn description(&self) -> &'static str {
        match self {
            InputCommand::Start => "リマインダーを開始",
            InputCommand::Drink => "水を飲んだ (カウントダウンをリセット)",
            InputCommand::Stop => "リマインダーを停止",
            InputCommand::Permission => "通知を許可",
            InputCommand::Status => "現在の状態を表示",
            InputCommand::History => "履歴を表示",
            InputCommand::Help => "ヘルプを表示",
            InputCommand::Quit => "終了",
        }
    }
}

impl fmt::Display for InputCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_command())
    }
}

/// Error for unrecognized input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("不明なコマンド: '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for InputCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        InputCommand::ALL
            .into_iter()
            .find(|command| {
                command.as_command() == input || command.aliases().contains(&input.as_str())
            })
            .ok_or_else(|| UnknownCommand(s.trim().to_string()))
    }
}
