//! # Engine Constants
//!
//! Core constants that define the operational boundaries of the debounce
//! engine: the coalescing period floor, configuration defaults, and the
//! saturation guard for the long-run sample counter.

/// Coalescing periods below this floor cost more latency than they save;
/// the debouncer falls back to immediate, uncoalesced execution instead.
pub const MIN_TIMER_PERIOD_MS: f64 = 250.0;

/// Default coalescing window when none is configured.
pub const DEFAULT_INTERVAL_MS: u64 = 500;

/// Default number of recent duration samples kept in the sliding window.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Default relative deviation between recent and baseline execution cost
/// required to trigger a rebalance (0.2 = 20%).
pub const DEFAULT_MIN_DEVIATION: f64 = 0.2;

/// Default multiplier applied to the recent average execution time when
/// computing a rebalanced coalescing period.
pub const DEFAULT_PERIOD_MULTIPLIER: f64 = 2.0;

/// Ceiling past which the evicted-sample counter saturates instead of
/// growing further.
pub const EVICTION_COUNT_SATURATION: f64 = f64::MAX * 0.9;

/// Value the evicted-sample counter resets to at saturation. Still large
/// enough that the running-average weighting is unaffected.
pub const EVICTION_COUNT_RESET: f64 = 100_000_000.0;
