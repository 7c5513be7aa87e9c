//! CLI module for the hydration reminder.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `input`: In-session line commands
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod input;

pub use commands::{Cli, Commands, RunArgs, SinkKind};
pub use display::Display;
pub use input::{InputCommand, UnknownCommand};
