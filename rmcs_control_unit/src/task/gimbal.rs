//! Gimbal task. Also publishes the yaw offset the chassis follows.

use rmcs_common::mode::GimbalMode;

use crate::config::RobotConfig;
use crate::cycle::{ControlTask, Tick};
use crate::error::ControlError;
use crate::mailbox::ReadCursor;
use crate::module::gimbal::{Gimbal, GimbalInput};
use crate::runtime::Runtime;
use crate::task::{Liveness, poll_latest};

pub struct GimbalTask {
    gimbal: Gimbal,
    input: GimbalInput,
    feedback: ReadCursor,
    imu: ReadCursor,
    cmd: ReadCursor,
    liveness: Liveness,
}

impl GimbalTask {
    pub fn new(config: &RobotConfig) -> Result<Self, ControlError> {
        Ok(Self {
            gimbal: Gimbal::new(&config.gimbal, f64::from(config.tasks.gimbal.freq_hz))?,
            input: GimbalInput::default(),
            feedback: ReadCursor::default(),
            imu: ReadCursor::default(),
            cmd: ReadCursor::default(),
            liveness: Liveness::new("gimbal"),
        })
    }
}

impl ControlTask for GimbalTask {
    fn name(&self) -> &'static str {
        "gimbal"
    }

    fn step(&mut self, rt: &Runtime, tick: &Tick) {
        poll_latest(&rt.feedback.gimbal, &mut self.feedback, &mut self.input.feedback);
        poll_latest(&rt.feedback.imu, &mut self.imu, &mut self.input.imu);
        poll_latest(&rt.cmd.gimbal, &mut self.cmd, &mut self.input.cmd);

        let timeout = rt.motor_feedback_timeout();
        let fresh = rt.feedback.gimbal.is_fresh(timeout) && rt.feedback.imu.is_fresh(timeout);
        let mut input = self.input;
        if !self.liveness.update(fresh) {
            input.cmd.mode = GimbalMode::Relax;
        }

        let output = self.gimbal.step(&input, tick.dt);
        rt.output.gimbal.publish(output);
        if fresh {
            rt.gimbal_yaw_offset.publish(self.gimbal.yaw_offset());
        }
        rt.ui.gimbal.publish(self.gimbal.ui());
    }
}
