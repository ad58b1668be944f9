use crate::observability::MetricsRecorder;
use crate::rate_limit::fixed_window::now_millis;
use crate::rate_limit::store::WindowStore;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Background task that drops expired windows from a store.
///
/// Runs from [`Sweeper::spawn`] until [`Sweeper::shutdown`] or drop.
pub struct Sweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Start sweeping `store` every `every`
    pub fn spawn(store: Arc<dyn WindowStore>, every: Duration) -> Self {
        let (shutdown, receiver) = oneshot::channel();
        let handle = tokio::spawn(sweep_loop(store, every, receiver));

        Self {
            shutdown: Some(shutdown),
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the task and wait for it to exit
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            warn!("Sweeper task ended abnormally: {:?}", e);
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn sweep_loop(
    store: Arc<dyn WindowStore>,
    every: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; nothing has expired yet
    ticker.tick().await;

    info!("Rate limit sweeper started (every {:?})", every);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            _ = ticker.tick() => {
                match store.sweep(now_millis()).await {
                    Ok(0) => debug!("Rate limit sweep found nothing to remove"),
                    Ok(removed) => {
                        MetricsRecorder::record_swept_entries(removed);
                        info!(removed = removed, "Swept expired rate limit windows");
                    }
                    Err(e) => warn!("Rate limit sweep failed: {:?}", e),
                }
            }
        }
    }

    info!("Rate limit sweeper stopped");
}
