//! Capacitor task.
//!
//! Blocks on capacitor feedback for up to the feedback timeout. A sample
//! runs update + control inside the runtime's critical section; a timeout
//! takes the controller offline. Output, state and UI are published every
//! activation either way. The feedback wait is reported through
//! `last_wait` so it does not count as cycle time.

use std::time::{Duration, Instant};

use rmcs_common::consts::GAME_CHASSIS_MAX_POWER_WO_REF;
use rmcs_common::msg::RefereeForCap;

use crate::config::RobotConfig;
use crate::cycle::{ControlTask, Tick};
use crate::error::ControlError;
use crate::mailbox::ReadCursor;
use crate::module::cap::CapController;
use crate::runtime::Runtime;
use crate::task::poll_latest;

pub struct CapTask {
    cap: CapController,
    feedback: ReadCursor,
    referee_cursor: ReadCursor,
    referee: RefereeForCap,
    waited: Duration,
}

impl CapTask {
    pub fn new(config: &RobotConfig) -> Result<Self, ControlError> {
        Ok(Self {
            cap: CapController::new(&config.cap, f64::from(config.tasks.cap.freq_hz))?,
            feedback: ReadCursor::default(),
            referee_cursor: ReadCursor::default(),
            referee: RefereeForCap::default(),
            waited: Duration::ZERO,
        })
    }

    #[inline]
    pub fn controller(&self) -> &CapController {
        &self.cap
    }
}

impl ControlTask for CapTask {
    fn name(&self) -> &'static str {
        "cap"
    }

    fn step(&mut self, rt: &Runtime, tick: &Tick) {
        poll_latest(&rt.referee.cap, &mut self.referee_cursor, &mut self.referee);

        let wait_start = Instant::now();
        let sample = rt
            .feedback
            .cap
            .recv_timeout(&mut self.feedback, rt.cap_feedback_timeout());
        self.waited = wait_start.elapsed();

        let output = match sample {
            Some(fb) => rt.critical(|| {
                self.cap.update(&fb);
                self.cap.control(&self.referee, tick.dt)
            }),
            None => self.cap.handle_offline(GAME_CHASSIS_MAX_POWER_WO_REF),
        };

        rt.output.cap.publish(output);
        rt.cap_state.publish(self.cap.state());
        rt.ui.cap.publish(self.cap.ui());
    }

    fn last_wait(&self) -> Duration {
        self.waited
    }
}
