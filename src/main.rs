//! Standby Guard CLI - keeps an idle soundbar out of standby
//!
//! Plays a short sound right away and then at a fixed interval:
//! - 540 seconds by default, just under common ten-minute standby timers
//! - optional tray icon on Windows
//! - optional start at login on Windows, macOS and Linux

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use standby_guard::autostart::LaunchCommand;
use standby_guard::cli::{AutostartCommand, Cli, Commands, ConfigCommand, Display, RunArgs};
use standby_guard::config::{AppConfig, ConfigStore, JsonConfigStore, DEFAULT_CONFIG_FILE};
use standby_guard::daemon::{Coordinator, Ports, ShutdownSignal};
use standby_guard::platform::{self, Platform};
use standby_guard::playback::PlaybackError;
use standby_guard::surface::SurfaceOptions;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        match e.downcast_ref::<PlaybackError>() {
            Some(playback) => {
                Display::show_error_with_hint(&format!("{:#}", e), playback.suggestion());
            }
            None => Display::show_error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let store = JsonConfigStore::new(config_path);
    let platform = Platform::detect();

    match &cli.command {
        Some(Commands::Autostart { action }) => manage_autostart(*action, &platform, &store)?,
        Some(Commands::Config { action }) => inspect_config(*action, &store)?,
        Some(Commands::Completions { shell }) => generate_completions(*shell),
        None | Some(Commands::Run(_)) => {
            let args = cli.run_args().cloned().unwrap_or_default();
            run(&args, &platform, store).await?;
        }
    }

    Ok(())
}

/// Runs the helper until a shutdown signal arrives.
async fn run(args: &RunArgs, platform: &Platform, store: JsonConfigStore) -> Result<()> {
    let config = store
        .load()
        .resolve(&store.base_dir())
        .with_overrides(&args.overrides());

    let playback = platform::select_playback_port(platform)
        .with_context(|| format!("Cannot play sounds on {}", platform))?;
    info!(engine = playback.name(), "Audio player initialized");

    let launch = LaunchCommand::current_exe(Some(store.path()))
        .context("Failed to resolve the executable path")?;
    let autostart = platform::select_autostart_port(platform, launch);
    let surface = platform::select_status_surface(platform);

    if config.status_surface_enabled && *platform != Platform::Windows {
        warn!("MinimizeToTray is only supported on Windows, running in console mode");
    }

    info!("Sound Timer started");
    info!("Sound file: {}", config.sound_path.display());
    info!(
        "Sound will play every {}",
        Display::format_interval(config.delay)
    );
    info!("Press Ctrl+C to exit");

    let options = SurfaceOptions::new("Sound Timer", "Sound Timer - Running")
        .with_autostart_label(format!("Start with {}", platform.display_name()));
    let ports = Ports {
        playback,
        autostart,
        surface,
    };

    let report = Coordinator::new(config, ports, Arc::new(store), ShutdownSignal::new())
        .with_surface_options(options)
        .with_signal_handlers()
        .run()
        .await;

    Display::log_exit_report(&report);
    Ok(())
}

/// Handles `autostart <action>`. Changes are also saved as `StartWithSystem`.
fn manage_autostart(
    action: AutostartCommand,
    platform: &Platform,
    store: &JsonConfigStore,
) -> Result<()> {
    let launch = LaunchCommand::current_exe(Some(store.path()))
        .context("Failed to resolve the executable path")?;
    let port = platform::select_autostart_port(platform, launch);

    let enabled = match action {
        AutostartCommand::Status => {
            Display::show_autostart_status(
                platform.display_name(),
                port.is_supported(),
                port.is_enabled(),
            );
            return Ok(());
        }
        _ if !port.is_supported() => {
            bail!("Autostart is not supported on {}", platform.display_name())
        }
        AutostartCommand::Enable => port
            .enable()
            .map(|()| true)
            .context("Failed to enable autostart")?,
        AutostartCommand::Disable => port
            .disable()
            .map(|()| false)
            .context("Failed to disable autostart")?,
        AutostartCommand::Toggle => port.toggle().context("Failed to toggle autostart")?,
    };

    let mut config = store.load();
    config.start_with_system = enabled;
    store.save(&config).context("Failed to save configuration")?;

    Display::show_autostart_changed(enabled);
    Ok(())
}

/// Handles `config <action>`. Never creates the file.
fn inspect_config(action: ConfigCommand, store: &JsonConfigStore) -> Result<()> {
    match action {
        ConfigCommand::Path => {
            let path = std::path::absolute(store.path())
                .unwrap_or_else(|_| store.path().to_path_buf());
            Display::show_config_path(&path);
        }
        ConfigCommand::Show => {
            let stored = if store.path().exists() {
                store.read()?
            } else {
                info!("Configuration file does not exist yet, showing defaults");
                AppConfig::default()
            };
            let effective = stored.resolve(&store.base_dir());
            Display::show_config(store.path(), &stored, &effective);
        }
    }
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
