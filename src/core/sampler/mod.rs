//! Background polling workers.
//!
//! A [`Sampler`] owns one OS thread that repeatedly asks a [`Collector`] for a
//! snapshot, publishes it to a [`SnapshotSink`], and sleeps for a fixed period.
//! Stopping is cooperative: [`Sampler::stop`] sets a [`CancelToken`] that the
//! loop checks before publishing and after every sleep, then waits a bounded
//! time for the thread to exit.
//!
//! # Examples
//!
//! ```no_run
//! use sysdeck::core::system_monitor::tasks::SystemStatsCollector;
//! use sysdeck::{Sampler, SamplerOptions};
//!
//! let (mut sampler, mut rx) =
//!     Sampler::with_channel(SystemStatsCollector::new(), SamplerOptions::default());
//! sampler.start()?;
//!
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! if let Some(snapshot) = rx.take_new() {
//!     println!("CPU {:.1}%", snapshot.cpu_percent);
//! }
//!
//! sampler.stop();
//! # Ok::<(), sysdeck::SysdeckError>(())
//! ```

mod cancel;
mod sink;

pub use cancel::CancelToken;
pub use sink::{snapshot_channel, SnapshotReceiver, SnapshotSender, SnapshotSink};

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Result, SysdeckError};

/// One kind of OS metric source polled by a [`Sampler`].
///
/// Implementations must tolerate partial failure: a missing sensor or a
/// process that vanished mid-scan becomes a sentinel value or a skipped row.
/// Returning `Err` means the whole cycle produced nothing.
pub trait Collector: Send + 'static {
    type Snapshot: Send + 'static;

    /// Short name used for the thread name and log lines.
    fn name(&self) -> &str;

    /// Runs once on the sampler thread before the first cycle.
    fn prime(&mut self) -> Result<()> {
        Ok(())
    }

    /// Pause between `prime` and the first cycle. Cancellable like the period.
    fn warmup(&self) -> Duration {
        Duration::ZERO
    }

    fn collect(&mut self) -> Result<Self::Snapshot>;
}

/// What the loop does when a cycle fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log the failure and run the next cycle.
    #[default]
    Continue,
    /// Log the failure and end the loop.
    StopOnError,
}

#[derive(Debug, Clone)]
pub struct SamplerOptions {
    pub period: Duration,
    /// Upper bound on how long [`Sampler::stop`] waits for the thread.
    pub stop_timeout: Duration,
    pub error_policy: ErrorPolicy,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            stop_timeout: Duration::from_secs(3),
            error_policy: ErrorPolicy::Continue,
        }
    }
}

impl SamplerOptions {
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }
}

/// Lifecycle of a sampler. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerState::Idle => write!(f, "idle"),
            SamplerState::Running => write!(f, "running"),
            SamplerState::Stopping => write!(f, "stopping"),
            SamplerState::Stopped => write!(f, "stopped"),
        }
    }
}

struct Shared {
    state: Mutex<SamplerState>,
    exited: Condvar,
}

/// Marks the sampler stopped when the worker thread leaves its loop, panics included.
struct ExitGuard {
    shared: Arc<Shared>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        *self.shared.state.lock() = SamplerState::Stopped;
        self.shared.exited.notify_all();
    }
}

type BoxedSink<T> = Box<dyn SnapshotSink<T>>;

/// A polling loop running on a dedicated thread.
///
/// Single-use: construct, [`start`](Sampler::start) once,
/// [`stop`](Sampler::stop) once. A stopped sampler cannot be restarted.
pub struct Sampler<C: Collector> {
    name: String,
    options: SamplerOptions,
    cancel: CancelToken,
    shared: Arc<Shared>,
    // Held across each publish; stop() takes it after cancelling to drain one in flight
    gate: Arc<Mutex<()>>,
    pending: Option<(C, BoxedSink<C::Snapshot>)>,
    handle: Option<JoinHandle<()>>,
}

impl<C: Collector> Sampler<C> {
    pub fn new<S>(collector: C, options: SamplerOptions, sink: S) -> Self
    where
        S: SnapshotSink<C::Snapshot>,
    {
        Self {
            name: collector.name().to_string(),
            options,
            cancel: CancelToken::new(),
            shared: Arc::new(Shared {
                state: Mutex::new(SamplerState::Idle),
                exited: Condvar::new(),
            }),
            gate: Arc::new(Mutex::new(())),
            pending: Some((collector, Box::new(sink))),
            handle: None,
        }
    }

    /// Build a sampler that publishes into a fresh latest-value channel.
    pub fn with_channel(
        collector: C,
        options: SamplerOptions,
    ) -> (Self, SnapshotReceiver<C::Snapshot>)
    where
        C::Snapshot: Sync,
    {
        let (tx, rx) = snapshot_channel();
        (Self::new(collector, options, tx), rx)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &SamplerOptions {
        &self.options
    }

    pub fn state(&self) -> SamplerState {
        *self.shared.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SamplerState::Running
    }

    /// Spawn the worker thread. Fails unless the sampler is `Idle`.
    pub fn start(&mut self) -> Result<()> {
        let mut state = self.shared.state.lock();
        if *state != SamplerState::Idle {
            return Err(SysdeckError::lifecycle(format!(
                "sampler '{}' cannot start while {}",
                self.name, *state
            )));
        }

        let (collector, sink) = self.pending.take().ok_or_else(|| {
            SysdeckError::lifecycle(format!("sampler '{}' has no collector", self.name))
        })?;

        let worker = Worker {
            name: self.name.clone(),
            options: self.options.clone(),
            cancel: self.cancel.clone(),
            gate: Arc::clone(&self.gate),
            shared: Arc::clone(&self.shared),
        };

        let spawned = thread::Builder::new()
            .name(format!("sampler-{}", self.name))
            .spawn(move || worker.run(collector, sink));
        self.handle = Some(settle_spawn(&self.name, &mut state, spawned)?);
        log::info!(
            "[{}] sampler started (period {:?})",
            self.name,
            self.options.period
        );

        Ok(())
    }

    /// Request cancellation and wait up to `stop_timeout` for the thread to exit.
    ///
    /// Returns once the sampler is `Stopped`. A publish already inside the sink
    /// may still finish, but none starts after this returns. If the thread does
    /// not exit in time it is detached; it will publish nothing further.
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            match *state {
                SamplerState::Idle => {
                    *state = SamplerState::Stopped;
                    self.pending = None;
                    return;
                }
                SamplerState::Stopped => return,
                SamplerState::Running => *state = SamplerState::Stopping,
                SamplerState::Stopping => {}
            }
        }

        self.cancel.cancel();
        let deadline = Instant::now() + self.options.stop_timeout;

        // Wait out an in-flight publish; a sink that never returns must not hang stop()
        if self.gate.try_lock_until(deadline).is_none() {
            log::warn!(
                "[{}] sink still publishing after {:?}",
                self.name,
                self.options.stop_timeout
            );
        }

        let exited = {
            let mut state = self.shared.state.lock();
            while *state != SamplerState::Stopped {
                if self
                    .shared
                    .exited
                    .wait_until(&mut state, deadline)
                    .timed_out()
                {
                    break;
                }
            }
            let exited = *state == SamplerState::Stopped;
            *state = SamplerState::Stopped;
            exited
        };

        match self.handle.take() {
            Some(handle) if exited => {
                if handle.join().is_err() {
                    log::error!("[{}] sampler thread panicked", self.name);
                }
            }
            Some(_) => {
                log::warn!(
                    "[{}] sampler thread did not exit within {:?}; detaching",
                    self.name,
                    self.options.stop_timeout
                );
            }
            None => {}
        }

        log::info!("[{}] sampler stopped", self.name);
    }
}

impl<C: Collector> Drop for Sampler<C> {
    fn drop(&mut self) {
        if matches!(
            self.state(),
            SamplerState::Running | SamplerState::Stopping
        ) {
            self.stop();
        }
    }
}

struct Worker {
    name: String,
    options: SamplerOptions,
    cancel: CancelToken,
    gate: Arc<Mutex<()>>,
    shared: Arc<Shared>,
}

impl Worker {
    fn run<C: Collector>(self, mut collector: C, mut sink: BoxedSink<C::Snapshot>) {
        let _exit = ExitGuard {
            shared: Arc::clone(&self.shared),
        };

        if let Err(e) = collector.prime() {
            log::warn!("[{}] initial sample failed: {}", self.name, e);
        }
        if !self.cancel.sleep(collector.warmup()) {
            log::debug!("[{}] cancelled during warm-up", self.name);
            return;
        }

        let mut cycle: u64 = 0;
        while !self.cancel.is_cancelled() {
            cycle += 1;

            match panic::catch_unwind(AssertUnwindSafe(|| collector.collect())) {
                Ok(Ok(snapshot)) => {
                    let _gate = self.gate.lock();
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    sink.publish(snapshot);
                    log::trace!("[{}] cycle {} published", self.name, cycle);
                }
                Ok(Err(e)) => {
                    log::warn!("[{}] cycle {} failed: {}", self.name, cycle, e);
                    if self.options.error_policy == ErrorPolicy::StopOnError {
                        break;
                    }
                }
                Err(payload) => {
                    log::error!(
                        "[{}] cycle {} panicked: {}",
                        self.name,
                        cycle,
                        panic_message(payload.as_ref())
                    );
                    if self.options.error_policy == ErrorPolicy::StopOnError {
                        break;
                    }
                }
            }

            if !self.cancel.sleep(self.options.period) {
                break;
            }
        }

        log::debug!("[{}] loop exited after {} cycles", self.name, cycle);
    }
}

/// Moves the state out of `Idle` whether or not the thread came up.
fn settle_spawn(
    name: &str,
    state: &mut SamplerState,
    spawned: std::io::Result<JoinHandle<()>>,
) -> Result<JoinHandle<()>> {
    match spawned {
        Ok(handle) => {
            *state = SamplerState::Running;
            Ok(handle)
        }
        Err(e) => {
            // The collector went down with the closure; no second start is possible
            *state = SamplerState::Stopped;
            log::error!("[{}] could not spawn sampler thread: {}", name, e);
            Err(e.into())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
