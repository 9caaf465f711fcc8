//! Command definitions for the standby-guard CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, RunOverrides};

// ============================================================================
// CLI Structure
// ============================================================================

/// Keeps an idle soundbar awake by playing a short sound at a fixed interval
#[derive(Parser, Debug)]
#[command(
    name = "standby-guard",
    version,
    about = "Keeps an idle soundbar out of standby",
    long_about = "Plays a short sound at a fixed interval so that a soundbar or \
                  speaker with an auto-standby timer stays awake.\n\
                  Runs in the background, optionally with a tray icon (Windows) \
                  and registration to start at login.",
    propagate_version = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Options for `run` when no subcommand is given
    #[command(flatten)]
    pub run: RunArgs,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments for the run command, whether or not `run` was spelled out.
    pub fn run_args(&self) -> Option<&RunArgs> {
        match &self.command {
            None => Some(&self.run),
            Some(Commands::Run(args)) => Some(args),
            Some(_) => None,
        }
    }
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Play the sound now and then at every interval until stopped
    Run(RunArgs),

    /// Manage starting at login
    Autostart {
        #[command(subcommand)]
        action: AutostartCommand,
    },

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Autostart actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutostartCommand {
    /// Show whether the helper starts at login
    Status,
    /// Register the helper to start at login
    Enable,
    /// Remove the login registration
    Disable,
    /// Flip the login registration
    Toggle,
}

/// Configuration actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the stored and effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command. None of them are saved to the config file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Seconds between two plays (overrides DelaySeconds)
    #[arg(
        short,
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..=AppConfig::MAX_DELAY_SECONDS)
    )]
    pub delay: Option<u64>,

    /// Sound file to play (overrides SoundFilePath)
    #[arg(short, long, value_name = "PATH")]
    pub sound: Option<PathBuf>,

    /// Run without the tray icon (overrides MinimizeToTray)
    #[arg(long)]
    pub no_tray: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            delay: self.delay.map(Duration::from_secs),
            sound_path: self.sound.clone(),
            disable_surface: self.no_tray,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
