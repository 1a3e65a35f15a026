//! Adaptive debounce for regeneration requests.
//!
//! Bursts of edits collapse into one generation: every [`Debouncer::schedule`]
//! cancels the pending action and restarts the timer. The delay tracks how
//! long the last generation took, clamped to [`DebounceBounds`], so cheap
//! codes feel instant and expensive ones aren't regenerated per keystroke.
//!
//! ```text
//!   UI thread                 timer thread                 UI thread
//!   schedule(a) ──Schedule──▶ wait(delay)
//!   schedule(b) ──Schedule──▶ drop a, wait(delay)
//!                             deadline ──invoke_and_wait──▶ run b
//! ```
//!
//! The action runs through a [`Dispatcher`]. With [`ui_channel`] it runs on
//! whichever thread drains the [`UiReceiver`], and the timer thread blocks
//! until it has finished, so at most one action is ever in flight.
//!
//! Every schedule bumps a generation counter. An action that was already
//! handed to the UI thread when a newer schedule arrived finds itself stale
//! when it is finally drained, and does nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace, warn};

pub const MIN_DELAY: Duration = Duration::from_millis(10);
pub const MAX_DELAY: Duration = Duration::from_millis(100);

pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Error, Debug)]
pub enum DebounceError {
    #[error("failed to start debounce timer: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceBounds {
    pub min: Duration,
    pub max: Duration,
}

impl Default for DebounceBounds {
    fn default() -> Self {
        Self {
            min: MIN_DELAY,
            max: MAX_DELAY,
        }
    }
}

/// Delay before regenerating: the last generation's cost, clamped to
/// `bounds`. Without a measured cost the minimum applies.
pub fn debounce_delay(last_cost: Option<Duration>, bounds: DebounceBounds) -> Duration {
    last_cost.unwrap_or(bounds.min).max(bounds.min).min(bounds.max)
}

// ============================================================================
// Dispatchers
// ============================================================================

/// Runs a debounced action on the thread that owns the generator.
pub trait Dispatcher: Send + 'static {
    /// Run `job` and return once it has finished. If the target thread is
    /// gone the job is dropped unrun.
    fn invoke_and_wait(&self, job: Job);
}

/// Runs the action directly on the timer thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn invoke_and_wait(&self, job: Job) {
        job();
    }
}

struct UiTask {
    job: Job,
    done: Sender<()>,
}

/// Sending half of [`ui_channel`].
#[derive(Clone)]
pub struct UiDispatcher {
    tasks: Sender<UiTask>,
}

/// Receiving half of [`ui_channel`]; drain it from the UI thread.
pub struct UiReceiver {
    tasks: Receiver<UiTask>,
}

/// A dispatcher that marshals actions onto the thread draining the receiver.
pub fn ui_channel() -> (UiDispatcher, UiReceiver) {
    let (tasks, rx) = mpsc::channel();
    (UiDispatcher { tasks }, UiReceiver { tasks: rx })
}

impl Dispatcher for UiDispatcher {
    fn invoke_and_wait(&self, job: Job) {
        let (done, finished) = mpsc::channel();
        if self.tasks.send(UiTask { job, done }).is_err() {
            debug!("UI receiver gone, dropping debounced action");
            return;
        }
        // Err means the receiver dropped the task without running it.
        let _ = finished.recv();
    }
}

impl UiTask {
    fn run(self) {
        (self.job)();
        let _ = self.done.send(());
    }
}

impl UiReceiver {
    /// Block for one action and run it. `false` once every dispatcher is gone.
    pub fn recv(&self) -> bool {
        match self.tasks.recv() {
            Ok(task) => {
                task.run();
                true
            }
            Err(_) => false,
        }
    }

    /// Like [`recv`](Self::recv), giving up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> bool {
        match self.tasks.recv_timeout(timeout) {
            Ok(task) => {
                task.run();
                true
            }
            Err(_) => false,
        }
    }

    /// Run every action already queued, without blocking.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.tasks.try_recv() {
            task.run();
            ran += 1;
        }
        ran
    }
}

// ============================================================================
// Debouncer
// ============================================================================

enum Command {
    Schedule { job: Job, deadline: Instant },
    Shutdown,
}

/// Owns the timer thread. Dropping it cancels any pending action and joins
/// the thread.
///
/// Drop the [`UiReceiver`] (if any) before the debouncer when both live on
/// the same thread, so a timer blocked on `invoke_and_wait` can finish.
pub struct Debouncer {
    control: Sender<Command>,
    bounds: DebounceBounds,
    handle: Option<JoinHandle<()>>,
    /// Generation of the most recent `schedule`.
    latest: Arc<AtomicU64>,
    /// Generation of the last action that ran to completion.
    settled: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(dispatcher: impl Dispatcher, bounds: DebounceBounds) -> Result<Self, DebounceError> {
        let (control, commands) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("qr-debounce".into())
            .spawn(move || timer_loop(commands, dispatcher))?;
        Ok(Self {
            control,
            bounds,
            handle: Some(handle),
            latest: Arc::new(AtomicU64::new(0)),
            settled: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn bounds(&self) -> DebounceBounds {
        self.bounds
    }

    /// Whether the most recently scheduled action has yet to run.
    pub fn is_pending(&self) -> bool {
        self.settled.load(Ordering::SeqCst) != self.latest.load(Ordering::SeqCst)
    }

    /// Replace any pending action with `job`, due after a delay derived from
    /// `last_cost`. Returns that delay.
    pub fn schedule(
        &self,
        last_cost: Option<Duration>,
        job: impl FnOnce() + Send + 'static,
    ) -> Duration {
        let delay = debounce_delay(last_cost, self.bounds);
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let settled = Arc::clone(&self.settled);
        let job: Job = Box::new(move || {
            if latest.load(Ordering::SeqCst) != generation {
                trace!(generation, "stale regeneration skipped");
                return;
            }
            job();
            settled.fetch_max(generation, Ordering::SeqCst);
        });
        let command = Command::Schedule {
            job,
            deadline: Instant::now() + delay,
        };
        if self.control.send(command).is_err() {
            warn!("debounce timer has stopped, action dropped");
        }
        trace!(delay_ms = delay.as_millis() as u64, "regeneration scheduled");
        delay
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.control.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("debounce timer panicked");
            }
        }
    }
}

fn timer_loop(commands: Receiver<Command>, dispatcher: impl Dispatcher) {
    let mut pending: Option<(Job, Instant)> = None;
    loop {
        let next = match &pending {
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some((_, deadline)) => {
                commands.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
        };
        match next {
            Ok(Command::Schedule { job, deadline }) => {
                if pending.replace((job, deadline)).is_some() {
                    trace!("pending regeneration superseded");
                }
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if let Some((job, _)) = pending.take() {
                    dispatcher.invoke_and_wait(job);
                }
            }
        }
    }
    trace!("debounce timer stopped");
}
