//! Daemon module for the standby helper.
//!
//! This module contains the core daemon functionality:
//! - `shutdown`: single-fire shutdown signal shared by every trigger
//! - `cycle`: one playback of the keep-alive sound
//! - `scheduler`: the recurring timer
//! - `signals`: OS signal listeners
//! - `coordinator`: lifecycle from startup to exit

pub mod coordinator;
pub mod cycle;
pub mod scheduler;
pub mod shutdown;
pub mod signals;

pub use coordinator::{
    reconcile_autostart, AutostartAction, Coordinator, ExitReport, LifecycleState, Ports,
    RUNNING_NOTIFICATION,
};
pub use cycle::{CycleCounts, CycleOutcome, PlaybackCycle, Trigger};
pub use scheduler::{Scheduler, DEFAULT_DISARM_GRACE};
pub use shutdown::{ShutdownSignal, ShutdownSource};
