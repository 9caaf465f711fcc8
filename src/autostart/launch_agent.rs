//! macOS LaunchAgent registration.
//!
//! A plist in `~/Library/LaunchAgents` with `RunAtLoad` makes launchd start
//! the helper at the next login. The file's presence is the registration;
//! nothing is loaded into the running launchd session.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::{AutostartError, Result};
use super::{AutostartPort, LaunchCommand};

/// LaunchAgent plist structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaunchAgentPlist {
    /// Service label (reverse domain format)
    #[serde(rename = "Label")]
    pub label: String,

    /// Program to execute with its arguments
    #[serde(rename = "ProgramArguments")]
    pub program_arguments: Vec<String>,

    /// Whether to start at login
    #[serde(rename = "RunAtLoad")]
    pub run_at_load: bool,

    /// Whether to automatically restart if the process terminates
    #[serde(rename = "KeepAlive")]
    pub keep_alive: bool,

    /// Working directory (optional)
    #[serde(rename = "WorkingDirectory", skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

impl LaunchAgentPlist {
    /// The service label, also used for the plist file name.
    pub const LABEL: &'static str = "com.SoundbarStandbyHelper";

    /// Creates a plist that starts `command` once at login.
    pub fn new(command: &LaunchCommand) -> Self {
        Self {
            label: Self::LABEL.to_string(),
            program_arguments: command.argv(),
            run_at_load: true,
            keep_alive: false,
            working_directory: None,
        }
    }

    /// Sets the working directory.
    pub fn with_working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Generates the plist XML string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, self).map_err(AutostartError::PlistSerialize)?;
        String::from_utf8(buf).map_err(AutostartError::PlistUtf8)
    }
}

/// Autostart port backed by a per-user LaunchAgent.
#[derive(Debug, Clone)]
pub struct LaunchAgent {
    command: LaunchCommand,
    home_override: Option<PathBuf>,
}

impl LaunchAgent {
    pub fn new(command: LaunchCommand) -> Self {
        Self {
            command,
            home_override: None,
        }
    }

    /// Uses `home` instead of the user's home directory.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_override = Some(home.into());
        self
    }

    /// Returns the plist path, `~/Library/LaunchAgents/<label>.plist`.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn plist_path(&self) -> Result<PathBuf> {
        let home = match &self.home_override {
            Some(home) => home.clone(),
            None => dirs::home_dir().ok_or(AutostartError::HomeDirectoryNotFound)?,
        };
        Ok(home.join(format!(
            "Library/LaunchAgents/{}.plist",
            LaunchAgentPlist::LABEL
        )))
    }

    fn build_plist(&self) -> LaunchAgentPlist {
        let plist = LaunchAgentPlist::new(&self.command);
        match self.command.program.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                plist.with_working_directory(dir.to_string_lossy())
            }
            _ => plist,
        }
    }
}

impl AutostartPort for LaunchAgent {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        self.plist_path().map(|p| p.exists()).unwrap_or(false)
    }

    fn enable(&self) -> Result<()> {
        let plist_path = self.plist_path()?;
        if let Some(parent) = plist_path.parent() {
            fs::create_dir_all(parent).map_err(AutostartError::DirectoryCreation)?;
        }

        // Rewriting an existing plist keeps exactly one registration and
        // refreshes the program path if the binary moved.
        let xml = self.build_plist().to_xml()?;
        fs::write(&plist_path, xml).map_err(AutostartError::EntryWrite)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&plist_path, fs::Permissions::from_mode(0o644))
                .map_err(AutostartError::PermissionSet)?;
        }

        tracing::info!(path = %plist_path.display(), "Startup enabled: application will start on login");
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let plist_path = self.plist_path()?;
        if !plist_path.exists() {
            tracing::debug!("LaunchAgent plist does not exist, nothing to remove");
            return Ok(());
        }

        fs::remove_file(&plist_path).map_err(AutostartError::EntryRemove)?;
        tracing::info!("Startup disabled: application will not start on login");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> LaunchCommand {
        LaunchCommand::new("/Applications/Helper/standby-guard")
            .with_args(["--config", "/Users/test/config.json"])
    }

    mod plist_tests {
        use super::*;

        #[test]
        fn test_new_creates_valid_config() {
            let plist = LaunchAgentPlist::new(&command());

            assert_eq!(plist.label, "com.SoundbarStandbyHelper");
            assert_eq!(
                plist.program_arguments,
                vec![
                    "/Applications/Helper/standby-guard",
                    "--config",
                    "/Users/test/config.json"
                ]
            );
            assert!(plist.run_at_load);
            assert!(!plist.keep_alive);
            assert!(plist.working_directory.is_none());
        }

        #[test]
        fn test_to_xml_generates_valid_xml() {
            let xml = LaunchAgentPlist::new(&command()).to_xml().unwrap();

            assert!(xml.contains("<key>Label</key>"));
            assert!(xml.contains("<string>com.SoundbarStandbyHelper</string>"));
            assert!(xml.contains("<key>ProgramArguments</key>"));
            assert!(xml.contains("<key>RunAtLoad</key>"));
            assert!(xml.contains("<true/>"));
            assert!(xml.contains("<key>KeepAlive</key>"));
            assert!(xml.contains("<false/>"));
            assert!(!xml.contains("WorkingDirectory"));
        }

        #[test]
        fn test_with_working_directory() {
            let xml = LaunchAgentPlist::new(&command())
                .with_working_directory("/Applications/Helper")
                .to_xml()
                .unwrap();

            assert!(xml.contains("<key>WorkingDirectory</key>"));
            assert!(xml.contains("<string>/Applications/Helper</string>"));
        }
    }

    mod port_tests {
        use super::*;

        #[test]
        fn test_plist_path_under_launch_agents() {
            let home = tempfile::tempdir().unwrap();
            let agent = LaunchAgent::new(command()).with_home_dir(home.path());

            let path = agent.plist_path().unwrap();
            assert!(path.starts_with(home.path().join("Library/LaunchAgents")));
            assert!(path.ends_with("com.SoundbarStandbyHelper.plist"));
        }

        #[test]
        fn test_enable_writes_plist() {
            let home = tempfile::tempdir().unwrap();
            let agent = LaunchAgent::new(command()).with_home_dir(home.path());

            assert!(!agent.is_enabled());
            agent.enable().unwrap();
            assert!(agent.is_enabled());

            let parsed: LaunchAgentPlist =
                plist::from_file(agent.plist_path().unwrap()).unwrap();
            assert_eq!(parsed.program_arguments, command().argv());
            assert_eq!(
                parsed.working_directory.as_deref(),
                Some("/Applications/Helper")
            );
        }

        #[test]
        fn test_enable_twice_is_idempotent() {
            let home = tempfile::tempdir().unwrap();
            let agent = LaunchAgent::new(command()).with_home_dir(home.path());

            agent.enable().unwrap();
            assert!(agent.is_enabled());
            agent.enable().unwrap();
            assert!(agent.is_enabled());

            let entries = fs::read_dir(home.path().join("Library/LaunchAgents"))
                .unwrap()
                .count();
            assert_eq!(entries, 1);
        }

        #[test]
        fn test_disable_twice_is_idempotent() {
            let home = tempfile::tempdir().unwrap();
            let agent = LaunchAgent::new(command()).with_home_dir(home.path());

            agent.enable().unwrap();
            agent.disable().unwrap();
            assert!(!agent.is_enabled());
            agent.disable().unwrap();
            assert!(!agent.is_enabled());
        }

        #[test]
        fn test_toggle() {
            let home = tempfile::tempdir().unwrap();
            let agent = LaunchAgent::new(command()).with_home_dir(home.path());

            assert!(agent.toggle().unwrap());
            assert!(agent.is_enabled());
            assert!(!agent.toggle().unwrap());
            assert!(!agent.is_enabled());
        }
    }
}
