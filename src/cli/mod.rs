//! CLI module for the standby helper.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;

pub use commands::{AutostartCommand, Cli, Commands, ConfigCommand, RunArgs};
pub use display::Display;
