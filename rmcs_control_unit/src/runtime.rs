//! Shared runtime context.
//!
//! One [`Runtime`] is built at startup and handed to every task behind an
//! `Arc`. It owns every mailbox, the coarse critical section, the running
//! flag and the scheduling epoch. Nothing here is global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rmcs_common::msg::{
    CapFeedback, CapOutput, CapState, CapUi, ChassisCmd, ChassisFeedback, ChassisOutput,
    ChassisUi, CmdUi, GimbalCmd, GimbalFeedback, GimbalOutput, GimbalUi, ImuSample,
    LauncherCmd, LauncherFeedback, LauncherOutput, LauncherUi, RcInput, RefereeForCap,
    RefereeForChassis, RefereeForLauncher,
};
use static_assertions::assert_impl_all;

use crate::config::RobotConfig;
use crate::mailbox::Mailbox;

/// Decoded ingress from the device bus.
#[derive(Debug, Default)]
pub struct FeedbackBus {
    pub chassis: Mailbox<ChassisFeedback>,
    pub gimbal: Mailbox<GimbalFeedback>,
    pub launcher: Mailbox<LauncherFeedback>,
    pub imu: Mailbox<ImuSample>,
    pub cap: Mailbox<CapFeedback>,
    pub rc: Mailbox<RcInput>,
}

/// Per-module commands from the command task.
#[derive(Debug, Default)]
pub struct CmdBus {
    pub chassis: Mailbox<ChassisCmd>,
    pub gimbal: Mailbox<GimbalCmd>,
    pub launcher: Mailbox<LauncherCmd>,
}

/// Referee budgets.
#[derive(Debug, Default)]
pub struct RefereeBus {
    pub cap: Mailbox<RefereeForCap>,
    pub chassis: Mailbox<RefereeForChassis>,
    pub launcher: Mailbox<RefereeForLauncher>,
}

/// Output commands for the device bus.
#[derive(Debug, Default)]
pub struct OutputBus {
    pub chassis: Mailbox<ChassisOutput>,
    pub gimbal: Mailbox<GimbalOutput>,
    pub launcher: Mailbox<LauncherOutput>,
    pub cap: Mailbox<CapOutput>,
}

/// UI summaries.
#[derive(Debug, Default)]
pub struct UiBus {
    pub cmd: Mailbox<CmdUi>,
    pub chassis: Mailbox<ChassisUi>,
    pub gimbal: Mailbox<GimbalUi>,
    pub launcher: Mailbox<LauncherUi>,
    pub cap: Mailbox<CapUi>,
}

#[derive(Debug)]
pub struct Runtime {
    pub config: RobotConfig,
    pub feedback: FeedbackBus,
    pub cmd: CmdBus,
    pub referee: RefereeBus,
    pub output: OutputBus,
    pub ui: UiBus,
    /// Capacitor condition for the chassis.
    pub cap_state: Mailbox<CapState>,
    /// Gimbal yaw relative to the chassis [rad], for chassis follow.
    pub gimbal_yaw_offset: Mailbox<f64>,
    critical: Mutex<()>,
    running: AtomicBool,
    epoch: Instant,
}

assert_impl_all!(Runtime: Send, Sync);

impl Runtime {
    pub fn new(config: RobotConfig) -> Self {
        Self {
            config,
            feedback: FeedbackBus::default(),
            cmd: CmdBus::default(),
            referee: RefereeBus::default(),
            output: OutputBus::default(),
            ui: UiBus::default(),
            cap_state: Mailbox::new(),
            gimbal_yaw_offset: Mailbox::new(),
            critical: Mutex::new(()),
            running: AtomicBool::new(true),
            epoch: Instant::now(),
        }
    }

    /// Run `f` inside the coarse critical section.
    ///
    /// Keep `f` short: every task that needs the section waits on it.
    #[inline]
    pub fn critical<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.critical.lock();
        f()
    }

    /// Common time origin for all task schedules.
    #[inline]
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask every task to exit at its next tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn rc_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeouts.rc_ms)
    }

    pub fn cap_feedback_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeouts.cap_feedback_ms)
    }

    pub fn motor_feedback_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeouts.motor_feedback_ms)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
