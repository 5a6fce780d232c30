//! Execution-cost feedback loop that retunes the coalescing period.
//!
//! One duration sample arrives per coalesced execution. When the recent
//! window of samples deviates from the long-run baseline by more than the
//! configured threshold, a new period is computed from the window average and
//! handed to the period callback. Shipped in two variants behind one trait so
//! the debouncer never branches on "is rebalancing on": an active
//! implementation and a no-op one.

use std::time::Duration;

use tracing::debug;

use super::windowed_average::WindowedAverage;
use crate::config::RebalanceOptions;

/// Consumer of per-execution duration samples.
pub trait Rebalancer: Send + Sync {
    /// Record the wall-clock duration of one coalesced execution.
    fn record_execution(&self, elapsed: Duration);
}

/// No-op variant used when auto-rebalancing is disabled.
#[derive(Debug, Default)]
pub struct DisabledRebalancer;

impl Rebalancer for DisabledRebalancer {
    fn record_execution(&self, _elapsed: Duration) {}
}

type PeriodCallback = Box<dyn Fn(f64) + Send + Sync>;

/// Active rebalancer: feeds samples into a [`WindowedAverage`] and fires the
/// period callback when recent execution cost drifts from the baseline.
///
/// No rebalance can fire before at least `window_size` samples have been
/// evicted: until then the long-run average is zero and deviation is defined
/// as zero, so the loop warms up silently.
pub struct ActiveRebalancer {
    averages: WindowedAverage,
    options: RebalanceOptions,
    on_new_period: PeriodCallback,
}

impl ActiveRebalancer {
    /// Wire a rebalancer to a period callback. Out-of-range options fall back
    /// to defaults.
    pub fn new(
        on_new_period: impl Fn(f64) + Send + Sync + 'static,
        options: RebalanceOptions,
    ) -> Self {
        let options = options.sanitized();
        Self {
            averages: WindowedAverage::new(options.window_size),
            options,
            on_new_period: Box::new(on_new_period),
        }
    }
}

impl Rebalancer for ActiveRebalancer {
    fn record_execution(&self, elapsed: Duration) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.averages.push(elapsed_ms);

        let deviation = self.averages.relative_deviation_of_window();
        if deviation > self.options.min_deviation {
            let new_period_ms = self.averages.window_average() * self.options.period_multiplier;
            debug!(
                deviation,
                new_period_ms, "execution cost shifted, rebalancing coalescing period"
            );
            (self.on_new_period)(new_period_ms);
        }
    }
}
