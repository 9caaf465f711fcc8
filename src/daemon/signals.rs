//! OS signal listeners feeding the shutdown signal.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal), `SIGTERM`: interrupt
//! - `SIGHUP` (controlling terminal closed): window close
//!
//! **Windows platforms:**
//! - `CTRL_C`, `CTRL_BREAK`: interrupt
//! - `CTRL_CLOSE` (console window closed): window close
//!
//! A window close gives the process little time before the OS kills it, so
//! it also arms a forced exit that fires if teardown has not finished.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::shutdown::{ShutdownSignal, ShutdownSource};

/// Delay before a window close forces the process to exit.
pub const FORCED_EXIT_DELAY: Duration = Duration::from_millis(500);

/// Running listener tasks. Dropping or releasing them stops listening.
#[derive(Debug, Default)]
pub struct SignalListeners {
    handles: Vec<JoinHandle<()>>,
}

impl SignalListeners {
    /// Stops all listeners.
    pub fn release(mut self) {
        self.abort_all();
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn abort_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for SignalListeners {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Registers the platform's signal listeners.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns an error if a signal handler cannot be registered.
pub fn install(shutdown: &ShutdownSignal) -> std::io::Result<SignalListeners> {
    let handles = spawn_listeners(shutdown)?;
    Ok(SignalListeners { handles })
}

#[cfg(unix)]
fn spawn_listeners(shutdown: &ShutdownSignal) -> std::io::Result<Vec<JoinHandle<()>>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let interrupt = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigint.recv() => info!("Received SIGINT"),
                _ = sigterm.recv() => info!("Received SIGTERM"),
            }
            shutdown.request(ShutdownSource::Interrupt);
        })
    };

    let hangup = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if sighup.recv().await.is_some() {
                info!("Received SIGHUP");
                on_window_close(&shutdown);
            }
        })
    };

    Ok(vec![interrupt, hangup])
}

#[cfg(windows)]
fn spawn_listeners(shutdown: &ShutdownSignal) -> std::io::Result<Vec<JoinHandle<()>>> {
    use tokio::signal::windows;

    let mut ctrl_c = windows::ctrl_c()?;
    let mut ctrl_break = windows::ctrl_break()?;
    let mut ctrl_close = windows::ctrl_close()?;

    let interrupt = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = ctrl_c.recv() => info!("Received CTRL_C"),
                _ = ctrl_break.recv() => info!("Received CTRL_BREAK"),
            }
            shutdown.request(ShutdownSource::Interrupt);
        })
    };

    let close = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if ctrl_close.recv().await.is_some() {
                info!("Received CTRL_CLOSE");
                on_window_close(&shutdown);
            }
        })
    };

    Ok(vec![interrupt, close])
}

#[cfg(not(any(unix, windows)))]
fn spawn_listeners(shutdown: &ShutdownSignal) -> std::io::Result<Vec<JoinHandle<()>>> {
    let shutdown = shutdown.clone();
    Ok(vec![tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            shutdown.request(ShutdownSource::Interrupt);
        }
    })])
}

fn on_window_close(shutdown: &ShutdownSignal) {
    handle_window_close(shutdown, FORCED_EXIT_DELAY, || std::process::exit(0));
}

/// Requests shutdown and arms `exit` to run after `delay`.
fn handle_window_close<F>(shutdown: &ShutdownSignal, delay: Duration, exit: F)
where
    F: FnOnce() + Send + 'static,
{
    shutdown.request(ShutdownSource::WindowClose);
    arm_forced_exit(delay, exit);
}

/// Runs `exit` on a separate thread after `delay`, unless the process has
/// exited already.
fn arm_forced_exit<F>(delay: Duration, exit: F)
where
    F: FnOnce() + Send + 'static,
{
    let spawned = std::thread::Builder::new()
        .name("forced-exit".to_string())
        .spawn(move || {
            std::thread::sleep(delay);
            warn!("Teardown did not finish in time, exiting");
            exit();
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to arm forced exit");
    }
}
