//! Linux registration through an XDG autostart desktop entry.
//!
//! Desktop sessions that follow the XDG Autostart specification launch every
//! `*.desktop` file in `$XDG_CONFIG_HOME/autostart` (`~/.config/autostart`
//! when unset) at login.

use std::fs;
use std::path::PathBuf;

use super::error::{AutostartError, Result};
use super::{AutostartPort, LaunchCommand};

/// File name of the desktop entry, without directory.
pub const DESKTOP_FILE_NAME: &str = "soundbar-standby-helper.desktop";

/// Autostart port backed by `<config dir>/autostart/<name>.desktop`.
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    command: LaunchCommand,
    home_override: Option<PathBuf>,
}

impl XdgAutostart {
    pub fn new(command: LaunchCommand) -> Self {
        Self {
            command,
            home_override: None,
        }
    }

    /// Uses `home/.config` instead of the user's config directory.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_override = Some(home.into());
        self
    }

    /// Returns the path of the desktop entry.
    ///
    /// Without an override this follows `XDG_CONFIG_HOME`, falling back to
    /// `$HOME/.config`.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined.
    pub fn entry_path(&self) -> Result<PathBuf> {
        let config_dir = match &self.home_override {
            Some(home) => home.join(".config"),
            None => dirs::config_dir().ok_or(AutostartError::HomeDirectoryNotFound)?,
        };
        Ok(config_dir.join("autostart").join(DESKTOP_FILE_NAME))
    }

    /// Renders the desktop entry contents.
    pub fn desktop_entry(&self) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=Soundbar Standby Helper\n\
             Comment=Prevents soundbars from entering standby mode\n\
             Exec={}\n\
             Icon=audio-headphones\n\
             Terminal=false\n\
             Categories=Utility;\n\
             X-GNOME-Autostart-enabled=true\n",
            exec_line(&self.command)
        )
    }
}

/// Builds the `Exec=` value, quoting arguments that contain spaces.
fn exec_line(command: &LaunchCommand) -> String {
    command
        .argv()
        .iter()
        .map(|arg| {
            if arg.contains(char::is_whitespace) || arg.contains('"') {
                format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl AutostartPort for XdgAutostart {
    fn is_supported(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        self.entry_path().map(|p| p.exists()).unwrap_or(false)
    }

    fn enable(&self) -> Result<()> {
        let path = self.entry_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(AutostartError::DirectoryCreation)?;
        }

        fs::write(&path, self.desktop_entry()).map_err(AutostartError::EntryWrite)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .map_err(AutostartError::PermissionSet)?;
        }

        tracing::info!(path = %path.display(), "Startup enabled: application will start on login");
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        let path = self.entry_path()?;
        if !path.exists() {
            return Ok(());
        }

        fs::remove_file(&path).map_err(AutostartError::EntryRemove)?;
        tracing::info!("Startup disabled: application will not start on login");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn autostart(home: &std::path::Path) -> XdgAutostart {
        XdgAutostart::new(
            LaunchCommand::new("/opt/helper/standby-guard")
                .with_args(["--config", "/home/me/My Settings/config.json"]),
        )
        .with_home_dir(home)
    }

    #[test]
    fn test_entry_path() {
        let home = tempfile::tempdir().unwrap();
        let path = autostart(home.path()).entry_path().unwrap();
        assert_eq!(
            path,
            home.path()
                .join(".config/autostart/soundbar-standby-helper.desktop")
        );
    }

    #[test]
    fn test_desktop_entry_contents() {
        let home = tempfile::tempdir().unwrap();
        let entry = autostart(home.path()).desktop_entry();

        assert!(entry.starts_with("[Desktop Entry]\n"));
        assert!(entry.contains("Type=Application\n"));
        assert!(entry.contains("X-GNOME-Autostart-enabled=true\n"));
        assert!(entry.contains(
            "Exec=/opt/helper/standby-guard --config \"/home/me/My Settings/config.json\"\n"
        ));
    }

    #[test]
    fn test_exec_line_escapes_quotes() {
        let command = LaunchCommand::new("/bin/x").with_args(["say \"hi\""]);
        assert_eq!(exec_line(&command), "/bin/x \"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_enable_disable_idempotent() {
        let home = tempfile::tempdir().unwrap();
        let port = autostart(home.path());

        port.enable().unwrap();
        assert!(port.is_enabled());
        port.enable().unwrap();
        assert!(port.is_enabled());

        port.disable().unwrap();
        assert!(!port.is_enabled());
        port.disable().unwrap();
        assert!(!port.is_enabled());
    }

    #[cfg(unix)]
    #[test]
    fn test_enable_sets_executable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let home = tempfile::tempdir().unwrap();
        let port = autostart(home.path());
        port.enable().unwrap();

        let mode = fs::metadata(port.entry_path().unwrap())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
