//! The coalescing executor: state machine, timer thread, and blocking submit.
//!
//! A debouncer wraps one caller-supplied action and accepts run requests from
//! arbitrary threads. In `Immediate` mode every request executes synchronously
//! on the calling thread. In `Batching` mode requests queue up and block until
//! the periodic flush executes the action once on behalf of everyone pending,
//! then releases all waiters.
//!
//! One flush serves many waiters with a single *representative* payload (the
//! most recently submitted one). The wrapped action is expected to be a
//! batch-recompute style operation that tolerates being invoked with a payload
//! that is not the one a given waiter submitted; callers learn that *a* flush
//! covering their submission happened, not that their specific payload ran.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::rebalancer::{ActiveRebalancer, DisabledRebalancer, Rebalancer};
use crate::config::{DebouncerConfig, RebalanceOptions};
use crate::constants::MIN_TIMER_PERIOD_MS;

/// The wrapped work callback. Invoked synchronously, once per flush, with a
/// representative payload. Failures are logged and swallowed so one failing
/// execution cannot corrupt pending-request accounting.
pub type Action<T> = Arc<dyn Fn(T) -> anyhow::Result<()> + Send + Sync>;

/// Commands delivered to the timer thread over its control channel. The
/// channel's receive timeout doubles as the periodic flush tick.
enum TimerCommand {
    /// Adopt a new coalescing period (milliseconds). Below the floor this
    /// permanently switches the debouncer to immediate mode.
    SetPeriod(f64),
    /// Flush once more and exit.
    Shutdown,
}

/// Completion signal shared between a blocked submitter and the flushing
/// timer thread. Write-once: `finish` is never undone.
#[derive(Default)]
struct Completion {
    finished: Mutex<bool>,
    signal: Condvar,
}

impl Completion {
    fn wait(&self) {
        let mut finished = self.finished.lock();
        while !*finished {
            self.signal.wait(&mut finished);
        }
    }

    fn finish(&self) {
        let mut finished = self.finished.lock();
        *finished = true;
        self.signal.notify_all();
    }
}

/// One queued run request: the submitted payload plus the handle its caller
/// is blocked on.
struct RunRequest<T> {
    id: Uuid,
    data: T,
    completion: Arc<Completion>,
}

impl<T> RunRequest<T> {
    fn new(data: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            completion: Arc::new(Completion::default()),
        }
    }
}

/// Mode flag and pending queue, guarded by one mutex so a submit can never
/// slip between the batching check and the final drain of a mode transition.
struct EngineState<T> {
    batching: bool,
    /// LIFO: the last element is the flush's representative payload.
    pending: Vec<RunRequest<T>>,
}

/// State shared between the public handle and the timer thread.
struct Core<T> {
    action: Action<T>,
    state: Mutex<EngineState<T>>,
    rebalancer: Box<dyn Rebalancer>,
}

impl<T: Clone + Send + 'static> Core<T> {
    /// Run the action, logging and swallowing both `Err` results and panics.
    fn run_action(&self, data: T) {
        let action = Arc::clone(&self.action);
        match catch_unwind(AssertUnwindSafe(move || action(data))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(error = %err, "debounced action failed"),
            Err(_) => error!("debounced action panicked"),
        }
    }

    /// Execute the action once on behalf of every pending request, release
    /// all waiters, and report the elapsed time to the rebalancer.
    ///
    /// Only the timer thread calls this, so flushes never overlap. Requests
    /// that arrive while the action runs are drained and released with this
    /// flush; requests arriving after the drain wait for the next one.
    fn flush(&self, in_timer: bool) {
        let representative = {
            let state = self.state.lock();
            match state.pending.last() {
                None => return,
                Some(request) => {
                    debug!(
                        request_id = %request.id,
                        pending = state.pending.len(),
                        in_timer,
                        "running coalesced action"
                    );
                    request.data.clone()
                }
            }
        };

        let started = Instant::now();
        self.run_action(representative);
        let elapsed = started.elapsed();

        let drained = std::mem::take(&mut self.state.lock().pending);
        let released = drained.len();
        for request in drained {
            request.completion.finish();
        }
        debug!(
            released,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "flush complete"
        );

        self.rebalancer.record_execution(elapsed);
    }

    /// Leave batching mode for good. Runs one final flush so requests already
    /// queued never strand; submits that arrive after the flag flips take the
    /// immediate path.
    fn enter_immediate(&self) {
        self.state.lock().batching = false;
        self.flush(false);
    }
}

/// Adaptive coalescing executor around one caller-supplied action.
///
/// Cheap to share: clone an `Arc<Debouncer<T>>` (or hand copies out through a
/// [`DebouncerRegistry`](super::registry::DebouncerRegistry)) and call
/// [`submit`](Self::submit) from any thread.
pub struct Debouncer<T: Clone + Send + 'static> {
    core: Arc<Core<T>>,
    control: Option<Sender<TimerCommand>>,
    timer: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + 'static> Debouncer<T> {
    /// Create a debouncer with default rebalance tuning.
    pub fn new(
        action: impl Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
        config: &DebouncerConfig,
    ) -> Self {
        Self::with_options(action, config, RebalanceOptions::default())
    }

    /// Create a debouncer with explicit rebalance tuning.
    ///
    /// Starts in immediate mode (no timer thread at all) when coalescing is
    /// disabled or the configured interval is below the 250 ms floor.
    pub fn with_options(
        action: impl Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
        config: &DebouncerConfig,
        options: RebalanceOptions,
    ) -> Self {
        let action: Action<T> = Arc::new(action);
        let batching = config.enabled && (config.interval_ms as f64) >= MIN_TIMER_PERIOD_MS;

        if !batching {
            info!(
                enabled = config.enabled,
                interval_ms = config.interval_ms,
                "coalescing off, running in immediate mode"
            );
            let core = Arc::new(Core {
                action,
                state: Mutex::new(EngineState {
                    batching: false,
                    pending: Vec::new(),
                }),
                rebalancer: Box::new(DisabledRebalancer),
            });
            return Self {
                core,
                control: None,
                timer: None,
            };
        }

        let (control_tx, control_rx) = unbounded();

        let rebalancer: Box<dyn Rebalancer> = if config.auto_rebalance {
            let feedback = control_tx.clone();
            Box::new(ActiveRebalancer::new(
                move |period_ms| {
                    let _ = feedback.send(TimerCommand::SetPeriod(period_ms));
                },
                options,
            ))
        } else {
            Box::new(DisabledRebalancer)
        };

        let core = Arc::new(Core {
            action,
            state: Mutex::new(EngineState {
                batching: true,
                pending: Vec::new(),
            }),
            rebalancer,
        });

        info!(
            interval_ms = config.interval_ms,
            auto_rebalance = config.auto_rebalance,
            "starting coalescing timer"
        );
        let timer_core = Arc::clone(&core);
        let initial_period = Duration::from_millis(config.interval_ms);
        let timer = thread::Builder::new()
            .name("debounce-timer".into())
            .spawn(move || timer_loop(&timer_core, &control_rx, initial_period))
            .expect("failed to spawn debounce timer thread");

        Self {
            core,
            control: Some(control_tx),
            timer: Some(timer),
        }
    }

    /// Submit a run request and block until the work it represents has
    /// executed.
    ///
    /// In immediate mode the action runs synchronously on this thread. In
    /// batching mode the request queues up and this call blocks until a flush
    /// covers it; the flush may have executed with another caller's payload.
    pub fn submit(&self, data: T) {
        let mut state = self.core.state.lock();
        if state.batching {
            let request = RunRequest::new(data);
            let request_id = request.id;
            let completion = Arc::clone(&request.completion);
            state.pending.push(request);
            drop(state);

            debug!(request_id = %request_id, "request queued, waiting for flush");
            completion.wait();
            debug!(request_id = %request_id, "request released");
        } else {
            drop(state);
            self.core.run_action(data);
        }
    }

    /// Whether the debouncer is currently coalescing (timer running) rather
    /// than executing immediately.
    pub fn is_batching(&self) -> bool {
        self.core.state.lock().batching
    }

    /// Stop coalescing gracefully: the timer thread flushes pending requests
    /// one final time and exits, and later submits take the immediate path.
    /// Dropping the debouncer does the same and additionally joins the thread.
    pub fn shutdown(&self) {
        if let Some(control) = &self.control {
            let _ = control.send(TimerCommand::Shutdown);
        }
    }
}

impl<T: Clone + Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(control) = self.control.take() {
            let _ = control.send(TimerCommand::Shutdown);
        }
        if let Some(timer) = self.timer.take() {
            let _ = timer.join();
        }
    }
}

/// The timer thread: flushes on every period tick and applies period feedback
/// from the rebalancer.
///
/// A period below the floor switches the debouncer to immediate mode and ends
/// the thread. It is never resurrected: period feedback only arrives from
/// flushes, and immediate executions produce none.
fn timer_loop<T: Clone + Send + 'static>(
    core: &Arc<Core<T>>,
    control: &Receiver<TimerCommand>,
    initial_period: Duration,
) {
    let mut period = initial_period;

    loop {
        match control.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => core.flush(true),
            Ok(TimerCommand::SetPeriod(period_ms)) => {
                if period_ms < MIN_TIMER_PERIOD_MS {
                    info!(
                        period_ms,
                        floor_ms = MIN_TIMER_PERIOD_MS,
                        "rebalanced period below floor, switching to immediate mode"
                    );
                    core.enter_immediate();
                    break;
                }
                debug!(period_ms, "coalescing period changed");
                period = Duration::from_secs_f64(period_ms / 1000.0);
            }
            Ok(TimerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                debug!("debounce timer shutting down");
                core.enter_immediate();
                break;
            }
        }
    }
}
