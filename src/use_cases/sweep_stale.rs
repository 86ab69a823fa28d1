use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::errors::SessionError;
use crate::domain::ports::{Clock, PlaySessionStore};

// Removes sessions whose heartbeats stopped arriving.
pub struct SweepStaleSessionsUseCase<C, S> {
    pub clock: C,
    pub store: S,
    // 0 disables sweeping.
    pub stale_after_seconds: u64,
}

impl<C, S> SweepStaleSessionsUseCase<C, S>
where
    C: Clock,
    S: PlaySessionStore,
{
    pub async fn execute(&self) -> Result<u64, SessionError> {
        if self.stale_after_seconds == 0 {
            return Ok(0);
        }

        let cutoff = self
            .clock
            .now_epoch_seconds()
            .saturating_sub(self.stale_after_seconds);

        self.store.remove_stale(cutoff).await.map_err(|err| {
            tracing::error!(error = %err, cutoff, "failed to sweep stale sessions");
            SessionError::StorageFailure
        })
    }
}

impl<C, S> SweepStaleSessionsUseCase<C, S>
where
    C: Clock + 'static,
    S: PlaySessionStore + 'static,
{
    // Run the sweep on a fixed interval until the runtime shuts down.
    pub fn spawn(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                // Failures are already logged; the next tick simply tries again.
                match self.execute().await {
                    Ok(removed) if removed > 0 => {
                        tracing::info!(removed, "expired stale playback sessions");
                    }
                    _ => {}
                }
            }
        })
    }
}
