// ABOUTME: Bounded convergence poll for function code updates.
// ABOUTME: Exponential backoff between status checks, distinct error on timeout.

use std::time::Duration;
use tokio::time::Instant;

use crate::cloud::{FunctionOps, FunctionUpdateStatus};
use crate::config::FunctionUpdateSettings;

use super::error::DeployError;

/// Doubling delay capped at a maximum.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            next: initial.min(max),
            max,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(self.max);
        delay
    }
}

/// Poll until the provider reports the last update as settled.
///
/// # Errors
///
/// `UpdateFailure` if the provider reports the update failed or the status
/// cannot be read, `UpdateTimeout` if it is still in progress after
/// `settings.timeout`.
pub async fn wait_for_function_update<C: FunctionOps>(
    cloud: &C,
    function: &str,
    settings: &FunctionUpdateSettings,
) -> Result<(), DeployError> {
    let start = Instant::now();
    let mut backoff = Backoff::new(settings.initial_backoff, settings.max_backoff);

    loop {
        let status = cloud
            .function_update_status(function)
            .await
            .map_err(|e| DeployError::UpdateFailure {
                message: e.to_string(),
            })?;

        match status {
            FunctionUpdateStatus::Successful => return Ok(()),
            FunctionUpdateStatus::Failed { reason } => {
                return Err(DeployError::UpdateFailure { message: reason });
            }
            FunctionUpdateStatus::InProgress => {}
        }

        let elapsed = start.elapsed();
        if elapsed >= settings.timeout {
            return Err(DeployError::UpdateTimeout {
                function: function.to_string(),
                waited: settings.timeout,
            });
        }

        let delay = backoff.next_delay().min(settings.timeout - elapsed);
        tracing::debug!(function, delay_ms = delay.as_millis() as u64, "update in progress");
        tokio::time::sleep(delay).await;
    }
}
