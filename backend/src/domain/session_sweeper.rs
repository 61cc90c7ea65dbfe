//! Periodic removal of expired sessions.
//!
//! Sessions that are never presented again are not cleaned up by
//! resolution, so the server runs a [`SessionSweeper`] in the background for
//! as long as it is up. The task stops when its [`SweeperHandle`] is shut
//! down or dropped.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::domain::ports::{SessionStore, SessionStoreError};

/// Default delay between sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Purges expired sessions from a store, once or on a timer.
pub struct SessionSweeper<S: ?Sized> {
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl<S> SessionSweeper<S>
where
    S: SessionStore + ?Sized + 'static,
{
    /// Sweeper over `sessions` running every [`SWEEP_INTERVAL`].
    pub fn new(sessions: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            clock,
            period: SWEEP_INTERVAL,
        }
    }

    /// Override the delay between sweeps.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(MIN_PERIOD);
        self
    }

    /// Delete every session expired at the clock's current instant.
    ///
    /// # Errors
    /// Propagates the store failure.
    pub async fn sweep(&self) -> Result<u64, SessionStoreError> {
        let purged = self.sessions.purge_expired(self.clock.utc()).await?;
        if purged > 0 {
            debug!(purged, "expired sessions purged");
        }
        Ok(purged)
    }

    /// Sweep every period until the returned handle is shut down. The first
    /// sweep happens one period from now; failures are logged and retried on
    /// the next tick.
    pub fn spawn(self) -> SweeperHandle {
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + self.period, self.period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if let Err(err) = self.sweep().await {
                    warn!(error = %err, "session sweep failed");
                }
            }
        });
        SweeperHandle(Some(task))
    }
}

/// Owner of a running sweep task.
#[derive(Debug)]
pub struct SweeperHandle(Option<JoinHandle<()>>);

impl SweeperHandle {
    /// Stop the background task.
    pub fn shutdown(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.0.take() {
            task.abort();
            debug!("session sweeper stopped");
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
