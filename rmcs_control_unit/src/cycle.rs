//! Fixed-period task scheduler.
//!
//! Every task runs on its own thread, paced delay-until from the runtime's
//! shared epoch: tick `n` is due at `epoch + n * period`. A tick that runs
//! long is counted as an overrun and the schedule skips the ticks already
//! missed instead of bursting to catch up.
//!
//! ## RT setup (`rt` feature)
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` once per process.
//! 2. Prefault stack pages.
//! 3. Per task thread: optional `sched_setaffinity`, then
//!    `sched_setscheduler(SCHED_FIFO, priority)`.
//!
//! Without the feature all RT calls are no-ops and sleeping uses
//! `std::thread::sleep`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::TaskSpec;
use crate::runtime::Runtime;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Running sum of squares for stddev computation.
    pub sum_sq_cycle_ns: i128,
    /// Cycles whose compute time (input waits excluded) exceeded the period.
    pub overruns: u64,
    /// Ticks skipped to get back on schedule. For a task that blocks on
    /// input this includes periods spent waiting.
    pub skipped: u64,
    /// Maximum wake-up latency [ns] (time between due and actual wake).
    pub max_latency_ns: i64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            sum_sq_cycle_ns: 0,
            overruns: 0,
            skipped: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        if duration_ns < self.min_cycle_ns {
            self.min_cycle_ns = duration_ns;
        }
        if duration_ns > self.max_cycle_ns {
            self.max_cycle_ns = duration_ns;
        }
        self.sum_cycle_ns += duration_ns;
        self.sum_sq_cycle_ns += (duration_ns as i128) * (duration_ns as i128);
        if latency_ns > self.max_latency_ns {
            self.max_latency_ns = latency_ns;
        }
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }

    /// Standard deviation of the cycle time [ns].
    pub fn stddev_cycle_ns(&self) -> f64 {
        if self.cycle_count < 2 {
            return 0.0;
        }
        let n = self.cycle_count as f64;
        let mean = self.sum_cycle_ns as f64 / n;
        let var = self.sum_sq_cycle_ns as f64 / n - mean * mean;
        var.max(0.0).sqrt()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
    /// Task thread could not be started.
    #[error("failed to spawn task {task}: {reason}")]
    Spawn { task: &'static str, reason: String },
    /// Task thread panicked.
    #[error("task {0} panicked")]
    Panicked(&'static str),
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the pages exist before the first tick.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// SCHED_FIFO for the calling thread.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Process-wide RT setup. Call once before spawning tasks.
pub fn rt_setup() -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    Ok(())
}

/// Per-thread RT setup for a task.
pub fn rt_setup_thread(spec: &TaskSpec) -> Result<(), CycleError> {
    prefault_stack();
    if let Some(cpu) = spec.cpu {
        rt_set_affinity(cpu)?;
    }
    rt_set_scheduler(spec.priority)
}

// ─── Tasks ──────────────────────────────────────────────────────────

/// One scheduled activation.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Schedule slot; skipped slots are not reused.
    pub index: u64,
    /// Wake time.
    pub now: Instant,
    /// Time since the previous activation [s] (nominal period on the first).
    pub dt: f64,
}

/// A periodic task body.
pub trait ControlTask: Send + 'static {
    fn name(&self) -> &'static str;

    /// One activation. Must not block longer than its own mailbox timeouts.
    fn step(&mut self, rt: &Runtime, tick: &Tick);

    /// Time the last `step` spent blocked on input. Excluded from the
    /// measured cycle time.
    fn last_wait(&self) -> Duration {
        Duration::ZERO
    }
}

#[cfg(feature = "rt")]
fn sleep_until(deadline: Instant) {
    use nix::sys::time::TimeSpec;
    use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

    let clock = ClockId::CLOCK_MONOTONIC;
    let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
        return;
    };
    match clock_gettime(clock) {
        Ok(now) => {
            let wake = now + TimeSpec::from_duration(remaining);
            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &wake);
        }
        Err(_) => thread::sleep(remaining),
    }
}

#[cfg(not(feature = "rt"))]
fn sleep_until(deadline: Instant) {
    if let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        thread::sleep(remaining);
    }
}

/// Nominal period for `spec`.
pub fn period_of(spec: &TaskSpec) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(spec.freq_hz.max(1)))
}

/// Run `task` on the calling thread until the runtime stops.
pub fn run_task<T: ControlTask + ?Sized>(task: &mut T, rt: &Runtime, spec: &TaskSpec) -> CycleStats {
    let period = period_of(spec);
    let period_ns = period.as_nanos() as i64;
    let mut stats = CycleStats::new();
    let mut index = 0u64;
    let mut due = rt.epoch();
    let mut last_wake: Option<Instant> = None;

    while rt.is_running() {
        sleep_until(due);
        if !rt.is_running() {
            break;
        }
        let now = Instant::now();
        let dt = last_wake.map_or(period.as_secs_f64(), |t| (now - t).as_secs_f64());
        last_wake = Some(now);

        task.step(rt, &Tick { index, now, dt });

        let duration_ns = now.elapsed().saturating_sub(task.last_wait()).as_nanos() as i64;
        let latency_ns = now.saturating_duration_since(due).as_nanos() as i64;
        stats.record(duration_ns, latency_ns);
        if duration_ns > period_ns {
            stats.overruns += 1;
            if stats.overruns == 1 || stats.overruns % 100 == 0 {
                warn!(
                    task = task.name(),
                    duration_ns,
                    budget_ns = period_ns,
                    overruns = stats.overruns,
                    "cycle overrun"
                );
            }
        }

        index += 1;
        due += period;
        let after = Instant::now();
        if due < after {
            let behind = (after - due).as_nanos() / period.as_nanos().max(1);
            let missed = behind as u64 + 1;
            stats.skipped += missed;
            index += missed;
            due += period * missed as u32;
        }
    }
    stats
}

/// Handle to a spawned task thread.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    handle: JoinHandle<CycleStats>,
}

impl TaskHandle {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wait for the task to exit and return its statistics.
    pub fn join(self) -> Result<CycleStats, CycleError> {
        self.handle.join().map_err(|_| CycleError::Panicked(self.name))
    }
}

/// Start `task` on its own thread.
pub fn spawn_task<T: ControlTask>(
    mut task: T,
    rt: Arc<Runtime>,
    spec: TaskSpec,
) -> Result<TaskHandle, CycleError> {
    let name = task.name();
    let handle = thread::Builder::new()
        .name(format!("rmcs-{name}"))
        .spawn(move || {
            if let Err(e) = rt_setup_thread(&spec) {
                warn!(task = name, error = %e, "RT setup failed, running best-effort");
            }
            info!(
                task = name,
                freq_hz = spec.freq_hz,
                priority = spec.priority,
                "task started"
            );
            let stats = run_task(&mut task, &rt, &spec);
            info!(task = name, cycles = stats.cycle_count, "task stopped");
            stats
        })
        .map_err(|e| CycleError::Spawn {
            task: name,
            reason: e.to_string(),
        })?;
    Ok(TaskHandle { name, handle })
}

// ─── Tests ──────────────────────────────────────────────────────────
