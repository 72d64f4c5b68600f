//! Orchestrator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::steps::StepPlanConfig;

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-attempt timeout in seconds. Applies to each agent invocation,
    /// not to the pipeline as a whole.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_seconds: u64,
    /// Initial backoff delay between retry attempts, milliseconds
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    /// Maximum backoff delay, milliseconds
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    /// Backoff multiplier
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: f64,
    /// Add jitter to backoff delays
    #[serde(default = "default_true")]
    pub retry_jitter: bool,
    /// Duration-model parameters for step plans
    #[serde(default)]
    pub step_plan: StepPlanConfig,
}

fn default_attempt_timeout() -> u64 {
    300
}

fn default_retry_initial_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    30_000
}

fn default_retry_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_seconds: default_attempt_timeout(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            retry_jitter: default_true(),
            step_plan: StepPlanConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// The per-attempt timeout as a `Duration`
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_seconds)
    }

    /// Backoff delay after failed attempt number `attempt` (1-based).
    ///
    /// Exponential in the attempt number, capped at the configured
    /// maximum, with up to a quarter of the capped delay added as jitter
    /// when enabled.
    #[must_use]
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let steps = f64::from(attempt.saturating_sub(1));
        let scaled =
            self.retry_initial_delay_ms as f64 * self.retry_backoff_multiplier.powf(steps);
        let capped = scaled.min(self.retry_max_delay_ms as f64) as u64;

        let jitter = if self.retry_jitter {
            clock_jitter(capped / 4)
        } else {
            0
        };
        Duration::from_millis(capped + jitter)
    }
}

/// Jitter in `0..max_ms`, seeded from the clock's sub-second nanos
fn clock_jitter(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::from(d.subsec_nanos()))
        % max_ms
}
