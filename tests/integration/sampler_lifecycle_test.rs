// Integration tests for the sampler thread lifecycle
// Fake collectors script each cycle so timing and failures are deterministic

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use sysdeck::{
    Collector, ErrorPolicy, Sampler, SamplerOptions, SamplerState, SysdeckError,
};

/// Counts cycles and optionally fails on one of them.
struct Scripted {
    cycles: Arc<AtomicUsize>,
    fail_on: Option<usize>,
}

impl Scripted {
    fn new(fail_on: Option<usize>) -> (Self, Arc<AtomicUsize>) {
        let cycles = Arc::new(AtomicUsize::new(0));
        (
            Self {
                cycles: Arc::clone(&cycles),
                fail_on,
            },
            cycles,
        )
    }
}

impl Collector for Scripted {
    type Snapshot = usize;

    fn name(&self) -> &str {
        "scripted"
    }

    fn collect(&mut self) -> sysdeck::Result<usize> {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(cycle) {
            return Err(SysdeckError::metric_collection("scripted failure"));
        }
        Ok(cycle)
    }
}

/// Produces three rows per cycle; on cycle 3 the middle row cannot be read.
struct Rows {
    cycle: usize,
}

impl Collector for Rows {
    type Snapshot = Vec<String>;

    fn name(&self) -> &str {
        "rows"
    }

    fn collect(&mut self) -> sysdeck::Result<Vec<String>> {
        self.cycle += 1;
        let reads: Vec<Result<String, SysdeckError>> = (0..3)
            .map(|i| {
                if self.cycle == 3 && i == 1 {
                    Err(SysdeckError::metric_collection("access denied"))
                } else {
                    Ok(format!("row{}", i))
                }
            })
            .collect();

        Ok(reads.into_iter().filter_map(|r| r.ok()).collect())
    }
}

/// Each cycle takes far longer than the stop timeout.
struct Sluggish {
    started: Arc<AtomicBool>,
    cycle_time: Duration,
}

impl Collector for Sluggish {
    type Snapshot = ();

    fn name(&self) -> &str {
        "sluggish"
    }

    fn collect(&mut self) -> sysdeck::Result<()> {
        self.started.store(true, Ordering::SeqCst);
        thread::sleep(self.cycle_time);
        Ok(())
    }
}

fn options(period_ms: u64) -> SamplerOptions {
    SamplerOptions {
        period: Duration::from_millis(period_ms),
        stop_timeout: Duration::from_secs(2),
        error_policy: ErrorPolicy::Continue,
    }
}

fn wait_for(condition: impl Fn() -> bool, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_stop_interrupts_long_period() {
    let (collector, cycles) = Scripted::new(None);
    let (mut sampler, _rx) = Sampler::with_channel(collector, options(60_000));

    sampler.start().unwrap();
    assert!(wait_for(
        || cycles.load(Ordering::SeqCst) >= 1,
        Duration::from_secs(2)
    ));

    let started = Instant::now();
    sampler.stop();

    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(sampler.state(), SamplerState::Stopped);
}

#[test]
fn test_no_publish_after_stop_returns() {
    let published = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&published);
    let (collector, _cycles) = Scripted::new(None);

    let mut sampler = Sampler::new(collector, options(5), move |_: usize| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    sampler.start().unwrap();
    assert!(wait_for(
        || published.load(Ordering::SeqCst) >= 3,
        Duration::from_secs(2)
    ));
    sampler.stop();

    let at_stop = published.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(published.load(Ordering::SeqCst), at_stop);
}

#[test]
fn test_failed_row_is_skipped_and_sampler_keeps_running() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);

    let mut sampler = Sampler::new(Rows { cycle: 0 }, options(10), move |rows: Vec<String>| {
        sink_seen.lock().push(rows);
    });

    sampler.start().unwrap();
    assert!(wait_for(|| seen.lock().len() >= 4, Duration::from_secs(2)));
    assert_eq!(sampler.state(), SamplerState::Running);
    sampler.stop();

    let seen = seen.lock();
    assert_eq!(seen[0], vec!["row0", "row1", "row2"]);
    assert_eq!(seen[2], vec!["row0", "row2"]);
    assert_eq!(seen[3], vec!["row0", "row1", "row2"]);
}

#[test]
fn test_failed_cycle_publishes_nothing_and_loop_continues() {
    let (collector, _cycles) = Scripted::new(Some(3));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);

    let mut sampler = Sampler::new(collector, options(5), move |cycle: usize| {
        sink_seen.lock().push(cycle);
    });

    sampler.start().unwrap();
    assert!(wait_for(|| seen.lock().len() >= 4, Duration::from_secs(2)));
    sampler.stop();

    let seen = seen.lock();
    assert_eq!(&seen[..4], &[1, 2, 4, 5]);
}

#[test]
fn test_stop_on_error_policy_ends_loop() {
    let (collector, cycles) = Scripted::new(Some(2));
    let mut opts = options(5);
    opts.error_policy = ErrorPolicy::StopOnError;

    let (mut sampler, mut rx) = Sampler::with_channel(collector, opts);
    sampler.start().unwrap();

    assert!(wait_for(
        || sampler.state() == SamplerState::Stopped,
        Duration::from_secs(2)
    ));
    assert_eq!(cycles.load(Ordering::SeqCst), 2);
    assert_eq!(rx.take_new().as_deref(), Some(&1));
}

#[test]
fn test_lifecycle_misuse_is_rejected() {
    let (collector, _cycles) = Scripted::new(None);
    let (mut sampler, _rx) = Sampler::with_channel(collector, options(10));

    sampler.start().unwrap();
    assert!(matches!(sampler.start(), Err(SysdeckError::Lifecycle(_))));

    sampler.stop();
    sampler.stop();
    assert_eq!(sampler.state(), SamplerState::Stopped);
    assert!(sampler.start().is_err());
}

#[test]
fn test_stop_before_start_is_terminal() {
    let (collector, cycles) = Scripted::new(None);
    let (mut sampler, _rx) = Sampler::with_channel(collector, options(10));

    sampler.stop();
    assert_eq!(sampler.state(), SamplerState::Stopped);
    assert!(sampler.start().is_err());
    assert_eq!(cycles.load(Ordering::SeqCst), 0);
}

#[test]
fn test_latest_value_channel_coalesces() {
    let (collector, cycles) = Scripted::new(None);
    let (mut sampler, mut rx) = Sampler::with_channel(collector, options(1));

    sampler.start().unwrap();
    assert!(wait_for(
        || cycles.load(Ordering::SeqCst) >= 10,
        Duration::from_secs(2)
    ));
    sampler.stop();

    // A cycle cut short by stop() is never published
    let latest = rx.take_new().unwrap();
    assert!(*latest >= 9);
    assert!(*latest + 1 >= cycles.load(Ordering::SeqCst));
    assert!(rx.take_new().is_none());
    assert!(wait_for(|| rx.is_closed(), Duration::from_secs(1)));
}

#[test]
fn test_stop_is_bounded_when_sink_blocks() {
    let entered = Arc::new(AtomicBool::new(false));
    let sink_entered = Arc::clone(&entered);
    // Rendezvous channel nobody reads: every send parks the sampler thread
    let (tx, rx) = mpsc::sync_channel::<usize>(0);

    let (collector, _cycles) = Scripted::new(None);
    let mut opts = options(5);
    opts.stop_timeout = Duration::from_millis(200);

    let mut sampler = Sampler::new(collector, opts, move |cycle: usize| {
        sink_entered.store(true, Ordering::SeqCst);
        let _ = tx.send(cycle);
    });

    sampler.start().unwrap();
    assert!(wait_for(
        || entered.load(Ordering::SeqCst),
        Duration::from_secs(2)
    ));

    let started = Instant::now();
    sampler.stop();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(sampler.state(), SamplerState::Stopped);
    drop(rx);
}

#[test]
fn test_stop_detaches_collector_that_outlives_timeout() {
    let started_flag = Arc::new(AtomicBool::new(false));
    let published = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&published);

    let collector = Sluggish {
        started: Arc::clone(&started_flag),
        cycle_time: Duration::from_millis(500),
    };
    let mut opts = options(5);
    opts.stop_timeout = Duration::from_millis(100);

    let mut sampler = Sampler::new(collector, opts, move |_: ()| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    sampler.start().unwrap();
    assert!(wait_for(
        || started_flag.load(Ordering::SeqCst),
        Duration::from_secs(2)
    ));

    let stopping = Instant::now();
    sampler.stop();

    assert!(stopping.elapsed() < Duration::from_millis(400));
    assert_eq!(sampler.state(), SamplerState::Stopped);

    // The detached cycle finishes later but must not reach the sink
    let at_stop = published.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(700));
    assert_eq!(published.load(Ordering::SeqCst), at_stop);
    assert_eq!(sampler.state(), SamplerState::Stopped);
}
