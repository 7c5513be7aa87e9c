//! Command definitions for the hydration reminder CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{ReminderConfig, DEFAULT_FREQUENCY_MINUTES, MAX_FREQUENCY_MINUTES};

// ============================================================================
// CLI Structure
// ============================================================================

/// Hydration reminder - reminds you to drink water at a fixed interval
#[derive(Parser, Debug)]
#[command(
    name = "hydrate",
    version,
    about = "水分補給リマインダー",
    long_about = "一定間隔で水分補給を通知するシンプルなリマインダー。\n\
                  時間内に drink しないと1分ごとに通知を繰り返します。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run an interactive reminder session
    Run(RunArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Where reminders are shown.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkKind {
    /// Desktop notification (notify-send / osascript)
    #[default]
    Desktop,
    /// Banner line in this terminal
    Terminal,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Reminder frequency in minutes (1-1440)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_FREQUENCY_MINUTES,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_FREQUENCY_MINUTES))
    )]
    pub frequency: u32,

    /// Where reminders are shown
    #[arg(short, long, value_enum, default_value_t = SinkKind::Desktop)]
    pub sink: SinkKind,

    /// Do not ask for notification permission on startup
    #[arg(long)]
    pub no_permission_prompt: bool,

    /// Start the reminder immediately
    #[arg(short, long)]
    pub auto_start: bool,

    /// Print the session history as JSON on exit
    #[arg(long)]
    pub json_history: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY_MINUTES,
            sink: SinkKind::Desktop,
            no_permission_prompt: false,
            auto_start: false,
            json_history: false,
        }
    }
}

impl RunArgs {
    /// Builds the reminder configuration from the arguments.
    pub fn to_config(&self) -> ReminderConfig {
        ReminderConfig::default().with_frequency_minutes(self.frequency)
    }
}

// ============================================================================
// Tests
// ============================================================================
