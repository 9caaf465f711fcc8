//! Display utilities for the standby-guard CLI.
//!
//! This module provides formatted output for:
//! - Autostart status and changes
//! - Configuration inspection
//! - Error messages

use std::path::Path;
use std::time::Duration;

use crate::config::{AppConfig, EffectiveConfig};
use crate::daemon::ExitReport;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows whether the helper starts at login.
    pub fn show_autostart_status(platform: &str, supported: bool, enabled: bool) {
        println!("{}", Self::autostart_status_line(platform, supported, enabled));
    }

    /// Shows the result of an autostart change.
    pub fn show_autostart_changed(enabled: bool) {
        if enabled {
            println!("* Autostart enabled");
            println!("  The helper will start at next login");
        } else {
            println!("* Autostart disabled");
            println!("  The helper will no longer start at login");
        }
    }

    /// Shows the stored settings and what they resolve to.
    pub fn show_config(path: &Path, stored: &AppConfig, effective: &EffectiveConfig) {
        println!("Configuration: {}", path.display());
        println!("─────────────────────────────");
        match serde_json::to_string_pretty(stored) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("(unprintable: {})", e),
        }
        println!();
        println!("Sound file:  {}", effective.sound_path.display());
        println!("Interval:    {}", Self::format_interval(effective.delay));
        println!(
            "Tray icon:   {}",
            if effective.status_surface_enabled { "on" } else { "off" }
        );
        println!(
            "Autostart:   {}",
            if effective.autostart_desired { "on" } else { "off" }
        );
    }

    /// Shows the configuration file path.
    pub fn show_config_path(path: &Path) {
        println!("{}", path.display());
    }

    /// Logs the summary of a finished run.
    pub fn log_exit_report(report: &ExitReport) {
        tracing::info!(
            source = %report
                .source
                .map_or_else(|| "none".to_string(), |s| s.to_string()),
            played = report.cycles.played,
            failed = report.cycles.failed,
            skipped = report.cycles.skipped,
            "Stopped"
        );
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Shows an error message followed by a hint.
    pub fn show_error_with_hint(message: &str, hint: &str) {
        eprintln!("Error: {}", message);
        eprintln!("  Hint: {}", hint);
    }

    fn autostart_status_line(platform: &str, supported: bool, enabled: bool) -> String {
        match (supported, enabled) {
            (false, _) => format!("Autostart: not supported on {}", platform),
            (true, true) => format!("Autostart: enabled ({})", platform),
            (true, false) => format!("Autostart: disabled ({})", platform),
        }
    }

    /// Formats an interval as seconds plus minutes:seconds.
    pub fn format_interval(delay: Duration) -> String {
        let total_seconds = delay.as_secs();
        let (minutes, seconds) = Self::format_time(total_seconds);
        format!("{} seconds ({}:{:02})", total_seconds, minutes, seconds)
    }

    /// Formats seconds as (minutes, seconds).
    fn format_time(total_seconds: u64) -> (u64, u64) {
        (total_seconds / 60, total_seconds % 60)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_time() {
            assert_eq!(Display::format_time(0), (0, 0));
            assert_eq!(Display::format_time(45), (0, 45));
            assert_eq!(Display::format_time(540), (9, 0));
            assert_eq!(Display::format_time(3661), (61, 1));
        }

        #[test]
        fn test_format_interval() {
            assert_eq!(
                Display::format_interval(Duration::from_secs(540)),
                "540 seconds (9:00)"
            );
            assert_eq!(
                Display::format_interval(Duration::from_secs(5)),
                "5 seconds (0:05)"
            );
        }
    }

    mod autostart_tests {
        use super::*;

        #[test]
        fn test_status_line() {
            assert_eq!(
                Display::autostart_status_line("Linux", true, true),
                "Autostart: enabled (Linux)"
            );
            assert_eq!(
                Display::autostart_status_line("macOS", true, false),
                "Autostart: disabled (macOS)"
            );
            assert_eq!(
                Display::autostart_status_line("freebsd", false, false),
                "Autostart: not supported on freebsd"
            );
        }
    }
}
