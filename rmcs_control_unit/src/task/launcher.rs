//! Launcher task.

use rmcs_common::mode::FireMode;

use crate::config::RobotConfig;
use crate::cycle::{ControlTask, Tick};
use crate::error::ControlError;
use crate::mailbox::ReadCursor;
use crate::module::launcher::{Launcher, LauncherInput};
use crate::runtime::Runtime;
use crate::task::{Liveness, poll_latest};

pub struct LauncherTask {
    launcher: Launcher,
    input: LauncherInput,
    feedback: ReadCursor,
    cmd: ReadCursor,
    referee: ReadCursor,
    liveness: Liveness,
}

impl LauncherTask {
    pub fn new(config: &RobotConfig) -> Result<Self, ControlError> {
        Ok(Self {
            launcher: Launcher::new(&config.launcher, f64::from(config.tasks.launcher.freq_hz))?,
            input: LauncherInput::default(),
            feedback: ReadCursor::default(),
            cmd: ReadCursor::default(),
            referee: ReadCursor::default(),
            liveness: Liveness::new("launcher"),
        })
    }
}

impl ControlTask for LauncherTask {
    fn name(&self) -> &'static str {
        "launcher"
    }

    fn step(&mut self, rt: &Runtime, tick: &Tick) {
        poll_latest(&rt.feedback.launcher, &mut self.feedback, &mut self.input.feedback);
        poll_latest(&rt.cmd.launcher, &mut self.cmd, &mut self.input.cmd);
        poll_latest(&rt.referee.launcher, &mut self.referee, &mut self.input.referee);

        let fresh = rt.feedback.launcher.is_fresh(rt.motor_feedback_timeout());
        let mut input = self.input;
        if !self.liveness.update(fresh) {
            input.cmd.fire_mode = FireMode::Relax;
        }

        let output = self.launcher.step(&input, tick.now, tick.dt);
        rt.output.launcher.publish(output);
        rt.ui.launcher.publish(self.launcher.ui());
    }
}
