//! Recurring playback timer.
//!
//! The timer runs as its own tokio task. It fires first after one full
//! `delay` and then every `delay`, awaiting each cycle before the next tick
//! so timer-driven cycles never overlap. A fire that comes due while a cycle
//! is still playing is delayed, not doubled up.

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::cycle::{PlaybackCycle, Trigger};
use super::shutdown::ShutdownSignal;

/// How long [`Scheduler::disarm`] waits for an in-flight cycle.
pub const DEFAULT_DISARM_GRACE: Duration = Duration::from_secs(10);

/// Longest timer period. Longer delays are clamped so the first deadline
/// stays representable as an [`Instant`].
pub const MAX_TIMER_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Handle to the armed timer task.
#[derive(Debug)]
pub struct Scheduler {
    handle: JoinHandle<()>,
    grace: Duration,
}

impl Scheduler {
    /// Spawns the timer. The first fire is `delay` from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(cycle: PlaybackCycle, delay: Duration, shutdown: ShutdownSignal) -> Self {
        let delay = if delay > MAX_TIMER_PERIOD {
            warn!(
                requested_secs = delay.as_secs(),
                max_secs = MAX_TIMER_PERIOD.as_secs(),
                "Timer delay too large, clamping"
            );
            MAX_TIMER_PERIOD
        } else {
            delay
        };
        debug!(delay_secs = delay.as_secs_f64(), "Arming timer");
        Self {
            handle: tokio::spawn(run_timer(cycle, delay, shutdown)),
            grace: DEFAULT_DISARM_GRACE,
        }
    }

    #[must_use]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Waits for the timer task to observe shutdown and exit.
    ///
    /// The task exits only once shutdown has been requested. If it is still
    /// running after the grace period (a cycle stuck in the engine, or no
    /// shutdown requested) it is aborted. Returns true on a clean exit.
    pub async fn disarm(mut self) -> bool {
        match tokio::time::timeout(self.grace, &mut self.handle).await {
            Ok(Ok(())) => {
                debug!("Timer disarmed");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Timer task ended abnormally");
                false
            }
            Err(_) => {
                warn!(
                    grace_secs = self.grace.as_secs_f64(),
                    "Timer did not stop in time, aborting it"
                );
                self.handle.abort();
                false
            }
        }
    }
}

async fn run_timer(cycle: PlaybackCycle, delay: Duration, shutdown: ShutdownSignal) {
    let Some(start) = Instant::now().checked_add(delay) else {
        warn!(delay_secs = delay.as_secs(), "Timer deadline out of range, timer idle");
        shutdown.wait().await;
        return;
    };
    let mut ticker = interval_at(start, delay);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.wait() => break,
            _ = ticker.tick() => {}
        }
        cycle.run(Trigger::Timer).await;
    }

    debug!("Timer loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::shutdown::ShutdownSource;
    use crate::playback::MockPlaybackPort;
    use std::sync::Arc;

    fn setup(port: &Arc<MockPlaybackPort>) -> (PlaybackCycle, ShutdownSignal) {
        let shutdown = ShutdownSignal::new();
        let cycle = PlaybackCycle::new(port.clone(), "ping.wav", shutdown.clone());
        (cycle, shutdown)
    }

    #[tokio::test]
    async fn test_first_fire_after_delay() {
        let port = Arc::new(MockPlaybackPort::new());
        let (cycle, shutdown) = setup(&port);

        let scheduler = Scheduler::arm(cycle, Duration::from_millis(200), shutdown.clone());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(port.play_count(), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(port.play_count() >= 1);

        shutdown.request(ShutdownSource::Interrupt);
        assert!(scheduler.disarm().await);
    }

    #[tokio::test]
    async fn test_fires_repeatedly() {
        let port = Arc::new(MockPlaybackPort::new());
        let (cycle, shutdown) = setup(&port);

        let scheduler = Scheduler::arm(cycle.clone(), Duration::from_millis(40), shutdown.clone());
        tokio::time::sleep(Duration::from_millis(300)).await;
        shutdown.request(ShutdownSource::Interrupt);
        assert!(scheduler.disarm().await);

        assert!(port.play_count() >= 3);
        assert_eq!(cycle.counts().played, port.play_count());
    }

    #[tokio::test]
    async fn test_no_fire_after_shutdown() {
        let port = Arc::new(MockPlaybackPort::new());
        let (cycle, shutdown) = setup(&port);

        let scheduler = Scheduler::arm(cycle, Duration::from_millis(50), shutdown.clone());
        shutdown.request(ShutdownSource::StatusSurface);
        assert!(scheduler.disarm().await);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(port.play_count(), 0);
    }

    #[tokio::test]
    async fn test_disarm_waits_for_in_flight_cycle() {
        let port = Arc::new(MockPlaybackPort::new().with_play_duration(Duration::from_millis(200)));
        let (cycle, shutdown) = setup(&port);

        let scheduler = Scheduler::arm(cycle, Duration::from_millis(20), shutdown.clone());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(port.started_count(), 1);

        shutdown.request(ShutdownSource::Interrupt);
        assert!(scheduler.disarm().await);

        assert_eq!(port.completed_count(), 1);
        assert_eq!(port.started_count(), 1);
    }

    #[tokio::test]
    async fn test_huge_delay_does_not_kill_timer() {
        let port = Arc::new(MockPlaybackPort::new());
        let (cycle, shutdown) = setup(&port);

        let scheduler =
            Scheduler::arm(cycle, Duration::from_secs(u64::MAX), shutdown.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown.request(ShutdownSource::Interrupt);
        assert!(scheduler.disarm().await);
        assert_eq!(port.play_count(), 0);
    }

    #[tokio::test]
    async fn test_disarm_aborts_after_grace() {
        let port = Arc::new(MockPlaybackPort::new());
        let (cycle, _shutdown) = setup(&port);

        // Shutdown never requested: the task cannot exit on its own.
        let scheduler = Scheduler::arm(cycle, Duration::from_secs(60), ShutdownSignal::new())
            .with_grace(Duration::from_millis(30));

        assert!(!scheduler.disarm().await);
    }
}
