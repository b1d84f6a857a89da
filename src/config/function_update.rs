// ABOUTME: Bounds for the function-update convergence poll.
// ABOUTME: Overall timeout plus exponential backoff between status checks.

use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionUpdateSettings {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_initial_backoff", with = "humantime_serde")]
    pub initial_backoff: Duration,

    #[serde(default = "default_max_backoff", with = "humantime_serde")]
    pub max_backoff: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_initial_backoff() -> Duration {
    Duration::from_secs(2)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(15)
}

impl Default for FunctionUpdateSettings {
    fn default() -> Self {
        FunctionUpdateSettings {
            timeout: default_timeout(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
        }
    }
}

impl FunctionUpdateSettings {
    /// Reject bounds that would poll without pause or never poll at all.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "function_update.timeout must be greater than zero".to_string(),
            ));
        }
        if self.initial_backoff.is_zero() {
            return Err(Error::InvalidConfig(
                "function_update.initial_backoff must be greater than zero".to_string(),
            ));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(Error::InvalidConfig(format!(
                "function_update.max_backoff ({}s) is shorter than initial_backoff ({}s)",
                self.max_backoff.as_secs_f64(),
                self.initial_backoff.as_secs_f64()
            )));
        }
        Ok(())
    }
}
