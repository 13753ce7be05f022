/// Background job scheduler
///
/// Owns the hourly reset-token sweep. `start` hands back the task's
/// `JoinHandle`; cancelling the token makes the loop return so shutdown can
/// await a clean exit.
use crate::context::AppContext;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub mod tasks;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<AppContext>,
    cancel: CancellationToken,
}

impl JobScheduler {
    pub fn new(context: Arc<AppContext>, cancel: CancellationToken) -> Self {
        Self { context, cancel }
    }

    /// Start the background jobs
    pub fn start(self) -> JoinHandle<()> {
        info!("Starting background job scheduler");
        tokio::spawn(self.reset_token_sweep_job())
    }

    /// Sweep spent and expired reset tokens (runs every hour)
    async fn reset_token_sweep_job(self) {
        let mut interval = interval(Duration::from_secs(3600));

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.cancel.cancelled() => {
                    info!("Reset token sweep shutting down");
                    return;
                }
            }

            match tasks::sweep_reset_tokens(&self.context).await {
                Ok(count) if count > 0 => info!("Swept {} expired or used reset tokens", count),
                Ok(_) => {}
                Err(e) => error!("Failed to sweep reset tokens: {}", e),
            }
        }
    }
}
