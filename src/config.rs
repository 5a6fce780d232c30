//! # Debounce Configuration
//!
//! Configuration value shapes consumed by the engine. Where those values come
//! from (file, environment, editor settings) is the embedding tool's concern;
//! this module defines the shapes, their defaults, and the lenient fallback
//! behavior for malformed values.
//!
//! Malformed or out-of-range values never fail loudly: the engine keeps the
//! previous (or default) value and logs a warning, so a typo in one option
//! cannot take the whole generation pipeline down.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_INTERVAL_MS, DEFAULT_MIN_DEVIATION, DEFAULT_PERIOD_MULTIPLIER, DEFAULT_WINDOW_SIZE,
};

/// Engine configuration, supplied once per registry entry and not mutated
/// externally afterwards. The debouncer tracks its *effective* period
/// separately once rebalancing kicks in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebouncerConfig {
    /// When false, every request executes immediately with no coalescing.
    pub enabled: bool,

    /// Desired coalescing window in milliseconds. Values below the 250 ms
    /// floor also disable coalescing.
    pub interval_ms: u64,

    /// Whether the rebalancer may retune the window from observed execution
    /// cost.
    pub auto_rebalance: bool,
}

impl Default for DebouncerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: DEFAULT_INTERVAL_MS,
            auto_rebalance: true,
        }
    }
}

impl DebouncerConfig {
    /// Option key controlling [`DebouncerConfig::enabled`].
    pub const KEY_ENABLED: &'static str = "enabled";
    /// Option key controlling [`DebouncerConfig::interval_ms`].
    pub const KEY_INTERVAL: &'static str = "interval";
    /// Option key controlling [`DebouncerConfig::auto_rebalance`].
    pub const KEY_AUTO_REBALANCE: &'static str = "auto_rebalance_enabled";

    /// Apply a single raw key/value option as fed in by the embedding tool.
    ///
    /// Unparseable values leave the current value untouched; the interval must
    /// parse as a positive integer. Unknown keys are ignored.
    pub fn apply_option(&mut self, key: &str, value: &str) {
        match key {
            Self::KEY_ENABLED => match value.parse() {
                Ok(enabled) => self.enabled = enabled,
                Err(_) => warn!(key, value, "ignoring malformed debounce option"),
            },
            Self::KEY_INTERVAL => match value.parse::<i64>() {
                Ok(interval) if interval > 0 => self.interval_ms = interval as u64,
                _ => warn!(key, value, "ignoring malformed debounce option"),
            },
            Self::KEY_AUTO_REBALANCE => match value.parse() {
                Ok(enabled) => self.auto_rebalance = enabled,
                Err(_) => warn!(key, value, "ignoring malformed debounce option"),
            },
            _ => debug!(key, "ignoring unknown debounce option"),
        }
    }
}

/// Tuning constants for the adaptive rebalancer. Immutable once a rebalancer
/// is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceOptions {
    /// Number of recent duration samples kept in the sliding window.
    pub window_size: usize,

    /// Relative deviation (0.2 = 20%) between the window average and the
    /// long-run baseline required to trigger a rebalance.
    pub min_deviation: f64,

    /// Multiplier applied to the window average when computing the new
    /// coalescing period.
    pub period_multiplier: f64,
}

impl Default for RebalanceOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_deviation: DEFAULT_MIN_DEVIATION,
            period_multiplier: DEFAULT_PERIOD_MULTIPLIER,
        }
    }
}

impl RebalanceOptions {
    /// Replace out-of-range tuning values with defaults rather than erroring.
    pub fn sanitized(self) -> Self {
        let mut options = self;

        if options.window_size == 0 {
            warn!("rebalance window size must be positive, using default");
            options.window_size = DEFAULT_WINDOW_SIZE;
        }
        if !options.min_deviation.is_finite() || options.min_deviation < 0.0 {
            warn!(
                min_deviation = options.min_deviation,
                "rebalance deviation threshold out of range, using default"
            );
            options.min_deviation = DEFAULT_MIN_DEVIATION;
        }
        if !options.period_multiplier.is_finite() || options.period_multiplier <= 0.0 {
            warn!(
                period_multiplier = options.period_multiplier,
                "rebalance period multiplier out of range, using default"
            );
            options.period_multiplier = DEFAULT_PERIOD_MULTIPLIER;
        }

        options
    }
}
