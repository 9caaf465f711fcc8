//! Windows registration through the per-user `Run` registry key.
//!
//! Values under `HKCU\Software\Microsoft\Windows\CurrentVersion\Run` are
//! executed by Explorer at logon. The value is managed with the `reg` tool
//! that ships with Windows.

use std::process::{Command, Output};

use super::error::{AutostartError, Result};
use super::{AutostartPort, LaunchCommand};

/// Registry key holding per-user logon commands.
pub const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";

/// Registry value name used for the helper.
pub const VALUE_NAME: &str = "SoundbarStandbyHelper";

/// Autostart port backed by a `Run` registry value.
#[derive(Debug, Clone)]
pub struct RunKeyAutostart {
    command: LaunchCommand,
}

impl RunKeyAutostart {
    pub fn new(command: LaunchCommand) -> Self {
        Self { command }
    }

    /// Renders the registry value data: quoted program followed by quoted arguments.
    pub fn value_data(&self) -> String {
        self.command
            .argv()
            .iter()
            .map(|arg| format!("\"{}\"", arg))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run_reg(args: &[&str]) -> Result<Output> {
        Command::new("reg")
            .args(args)
            .output()
            .map_err(|e| AutostartError::RegistryExecution(e.to_string()))
    }
}

impl AutostartPort for RunKeyAutostart {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        // `reg query` exits non-zero when the value does not exist.
        match Self::run_reg(&["query", RUN_KEY, "/v", VALUE_NAME]) {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!("reg query failed: {}", e);
                false
            }
        }
    }

    fn enable(&self) -> Result<()> {
        let data = self.value_data();
        // `/f` overwrites an existing value, so repeated calls keep one entry.
        let output = Self::run_reg(&[
            "add", RUN_KEY, "/v", VALUE_NAME, "/t", "REG_SZ", "/d", &data, "/f",
        ])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AutostartError::RegistryUpdate(stderr.trim().to_string()));
        }

        tracing::info!("Startup enabled: application will start with Windows");
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let output = Self::run_reg(&["delete", RUN_KEY, "/v", VALUE_NAME, "/f"])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AutostartError::RegistryUpdate(stderr.trim().to_string()));
        }

        tracing::info!("Startup disabled: application will not start with Windows");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_data_quotes_every_part() {
        let port = RunKeyAutostart::new(
            LaunchCommand::new(r"C:\Program Files\Helper\standby-guard.exe")
                .with_args(["--config", r"C:\Users\me\config.json"]),
        );

        assert_eq!(
            port.value_data(),
            r#""C:\Program Files\Helper\standby-guard.exe" "--config" "C:\Users\me\config.json""#
        );
    }

    #[test]
    fn test_constants() {
        assert!(RUN_KEY.starts_with("HKCU"));
        assert!(RUN_KEY.ends_with(r"CurrentVersion\Run"));
        assert_eq!(VALUE_NAME, "SoundbarStandbyHelper");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_is_enabled_false_without_reg_tool() {
        let port = RunKeyAutostart::new(LaunchCommand::new("/bin/x"));
        assert!(!port.is_enabled());
    }
}
