#![allow(clippy::doc_markdown)] // Allow technical terms like LIFO in docs
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Debounce Core
//!
//! Adaptive debounce/coalescing execution engine for tools that react to
//! bursts of expensive work requests — typically code generators driven by a
//! compiler pipeline, where many files recompile together and each request
//! asks for the same regeneration.
//!
//! ## Overview
//!
//! The engine does three things:
//!
//! - **Coalesces** bursts of requests into a single actual execution: callers
//!   block until a periodic flush runs the wrapped action once on behalf of
//!   everyone pending, then releases all of them.
//! - **Falls back to immediate execution** when the coalescing window would
//!   add more latency than it saves (below a 250 ms floor, or when disabled).
//! - **Self-tunes** the window from observed execution cost: a sliding-window
//!   average compared against a long-run baseline drives period rebalancing,
//!   with no manual retuning.
//!
//! ## Module Organization
//!
//! - [`debounce`] - the engine: windowed average, rebalancer, debouncer, registry
//! - [`config`] - configuration value shapes and lenient fallbacks
//! - [`constants`] - operational boundary constants
//! - [`logging`] - tracing setup for standalone use
//!
//! ## Quick Start
//!
//! ```rust
//! use debounce_core::{Debouncer, DebouncerConfig, DebouncerRegistry};
//!
//! let registry: DebouncerRegistry<Vec<String>> = DebouncerRegistry::new();
//! let config = DebouncerConfig::default();
//!
//! let debouncer = registry.get_or_create("regenerate", &config, |files| {
//!     // Recompute everything currently pending; the payload is a
//!     // representative submission, not necessarily this caller's.
//!     println!("regenerating after {} changed files", files.len());
//!     Ok(())
//! });
//!
//! // Any number of threads may submit; bursts inside one window execute once.
//! debouncer.submit(vec!["lib.rs".to_string()]);
//! ```
//!
//! ## Failure Policy
//!
//! `submit` is infallible by design: action failures during a flush are
//! logged and swallowed, and every waiter of that flush is released. Callers
//! that need success signals should carry them inside the action itself.

pub mod config;
pub mod constants;
pub mod debounce;
pub mod logging;

pub use config::{DebouncerConfig, RebalanceOptions};
pub use debounce::{
    Action, ActiveRebalancer, Debouncer, DebouncerRegistry, DisabledRebalancer, Rebalancer,
    WindowedAverage,
};
pub use logging::init_logging;
