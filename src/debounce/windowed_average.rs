//! Sliding-window average with a long-run baseline built from evicted samples.
//!
//! The window captures *recent* behavior; the long-run average is a
//! slower-moving baseline computed only from samples that have already aged
//! out of the window. Comparing the two detects a shift in execution cost
//! without being swamped by the most recent, possibly noisy, samples.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::{EVICTION_COUNT_RESET, EVICTION_COUNT_SATURATION};

#[derive(Debug, Default)]
struct WindowState {
    /// Most recent samples, oldest first. Never longer than `window_size`.
    window: VecDeque<f64>,
    /// How many samples have ever been evicted. Saturates instead of
    /// overflowing: the weighting formula only needs a large-enough
    /// denominator.
    evicted_count: f64,
    /// Running average over evicted samples only. Zero until the first
    /// eviction.
    long_run_avg: f64,
}

impl WindowState {
    fn fold_into_baseline(&mut self, evicted: f64) {
        self.long_run_avg =
            (self.evicted_count * self.long_run_avg + evicted) / (self.evicted_count + 1.0);
        self.evicted_count += 1.0;

        if self.evicted_count % 10.0 == 0.0 {
            debug!(long_run_avg = self.long_run_avg, "long-run average updated");
        }
        if self.evicted_count > EVICTION_COUNT_SATURATION {
            self.evicted_count = EVICTION_COUNT_RESET;
        }
    }

    fn window_average(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    fn relative_deviation(&self, value: f64) -> f64 {
        if self.long_run_avg == 0.0 {
            // No baseline yet, nothing to compare against.
            return 0.0;
        }
        (self.long_run_avg - value).abs() / self.long_run_avg
    }
}

/// Thread-safe windowed average over duration samples (milliseconds).
///
/// All mutation happens under a single mutex per instance: concurrent pushes
/// serialize, and queries never observe a half-updated window.
#[derive(Debug)]
pub struct WindowedAverage {
    window_size: usize,
    state: Mutex<WindowState>,
}

impl WindowedAverage {
    /// Create a windowed average keeping the `window_size` most recent
    /// samples. A zero size is clamped to one.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            state: Mutex::new(WindowState::default()),
        }
    }

    /// Record a sample. While the window is full the oldest sample is evicted
    /// and folded into the long-run baseline first. Non-finite samples are
    /// ignored.
    pub fn push(&self, value: f64) {
        if !value.is_finite() {
            warn!(value, "ignoring non-finite duration sample");
            return;
        }

        let mut state = self.state.lock();
        while state.window.len() >= self.window_size {
            if let Some(evicted) = state.window.pop_front() {
                state.fold_into_baseline(evicted);
            }
        }
        state.window.push_back(value);
    }

    /// Arithmetic mean of the samples currently in the window; zero when the
    /// window is empty.
    pub fn window_average(&self) -> f64 {
        self.state.lock().window_average()
    }

    /// Running average of evicted samples; zero until the first eviction.
    pub fn long_run_average(&self) -> f64 {
        self.state.lock().long_run_avg
    }

    /// `|long_run - value| / long_run`, or zero while there is no baseline.
    pub fn relative_deviation(&self, value: f64) -> f64 {
        self.state.lock().relative_deviation(value)
    }

    /// Deviation of the current window average from the long-run baseline.
    /// Window and baseline are read under one lock so the comparison is never
    /// torn by a concurrent push.
    pub fn relative_deviation_of_window(&self) -> f64 {
        let state = self.state.lock();
        state.relative_deviation(state.window_average())
    }
}
