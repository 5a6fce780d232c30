//! # Adaptive Debounce Subsystem
//!
//! The coalescing execution engine, leaf-first:
//!
//! - [`WindowedAverage`] — sliding window of recent duration samples plus a
//!   long-run baseline of evicted ones.
//! - [`Rebalancer`] — turns per-execution duration samples into period
//!   adjustments ([`ActiveRebalancer`]) or ignores them ([`DisabledRebalancer`]).
//! - [`Debouncer`] — the state machine: blocking submits, periodic coalesced
//!   flushes, immediate fallback below the period floor.
//! - [`DebouncerRegistry`] — one shared debouncer (and tuning history) per
//!   logical action identity.

pub mod debouncer;
pub mod rebalancer;
pub mod registry;
pub mod windowed_average;

pub use debouncer::{Action, Debouncer};
pub use rebalancer::{ActiveRebalancer, DisabledRebalancer, Rebalancer};
pub use registry::DebouncerRegistry;
pub use windowed_average::WindowedAverage;
