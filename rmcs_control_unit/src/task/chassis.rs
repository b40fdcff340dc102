//! Chassis task.

use rmcs_common::mode::ChassisMode;

use crate::config::RobotConfig;
use crate::cycle::{ControlTask, Tick};
use crate::error::ControlError;
use crate::mailbox::ReadCursor;
use crate::module::chassis::{Chassis, ChassisInput};
use crate::runtime::Runtime;
use crate::task::{Liveness, poll_latest};

#[derive(Default)]
struct Cursors {
    feedback: ReadCursor,
    cmd: ReadCursor,
    cap: ReadCursor,
    yaw_offset: ReadCursor,
    referee: ReadCursor,
}

pub struct ChassisTask {
    chassis: Chassis,
    input: ChassisInput,
    cursors: Cursors,
    liveness: Liveness,
}

impl ChassisTask {
    pub fn new(config: &RobotConfig) -> Result<Self, ControlError> {
        Ok(Self {
            chassis: Chassis::new(&config.chassis, f64::from(config.tasks.chassis.freq_hz))?,
            input: ChassisInput::default(),
            cursors: Cursors::default(),
            liveness: Liveness::new("chassis"),
        })
    }
}

impl ControlTask for ChassisTask {
    fn name(&self) -> &'static str {
        "chassis"
    }

    fn step(&mut self, rt: &Runtime, tick: &Tick) {
        let c = &mut self.cursors;
        let input = &mut self.input;
        poll_latest(&rt.feedback.chassis, &mut c.feedback, &mut input.feedback);
        poll_latest(&rt.cmd.chassis, &mut c.cmd, &mut input.cmd);
        poll_latest(&rt.cap_state, &mut c.cap, &mut input.cap);
        poll_latest(&rt.gimbal_yaw_offset, &mut c.yaw_offset, &mut input.yaw_offset);
        poll_latest(&rt.referee.chassis, &mut c.referee, &mut input.referee);

        let fresh = rt.feedback.chassis.is_fresh(rt.motor_feedback_timeout());
        let mut input = self.input;
        if !self.liveness.update(fresh) {
            input.cmd.mode = ChassisMode::Relax;
        }

        let output = self.chassis.step(&input, tick.dt);
        rt.output.chassis.publish(output);
        rt.ui.chassis.publish(self.chassis.ui());
    }
}
