//! Periodic task bodies: mailbox I/O around the modules.
//!
//! | Task       | Reads                                  | Publishes                           |
//! |------------|----------------------------------------|-------------------------------------|
//! | `cmd`      | rc                                     | chassis/gimbal/launcher cmd, cmd UI |
//! | `cap`      | cap feedback (blocking), cap referee   | cap output, cap state, cap UI       |
//! | `chassis`  | chassis feedback, cmd, cap state, yaw offset, referee | chassis output, UI   |
//! | `gimbal`   | gimbal feedback, IMU, cmd              | gimbal output, yaw offset, UI       |
//! | `launcher` | launcher feedback, cmd, referee        | launcher output, UI                 |
//!
//! Only the capacitor task blocks on its feedback; the others poll and
//! treat feedback older than the motor timeout as lost, which relaxes the
//! module until it returns.

pub mod cap;
pub mod chassis;
pub mod cmd;
pub mod gimbal;
pub mod launcher;

use std::sync::Arc;

use tracing::{info, warn};

use crate::cycle::{CycleError, TaskHandle, spawn_task};
use crate::error::ControlError;
use crate::mailbox::{Mailbox, ReadCursor};
use crate::runtime::Runtime;

pub use cap::CapTask;
pub use chassis::ChassisTask;
pub use cmd::CmdTask;
pub use gimbal::GimbalTask;
pub use launcher::LauncherTask;

/// Overwrite `slot` with the mailbox's newest value, if any arrived.
#[inline]
pub(crate) fn poll_latest<T: Copy>(mailbox: &Mailbox<T>, cursor: &mut ReadCursor, slot: &mut T) {
    if let Some(value) = mailbox.try_recv(cursor) {
        *slot = value;
    }
}

/// Logs feedback liveness edges for one source.
#[derive(Debug, Clone)]
pub(crate) struct Liveness {
    source: &'static str,
    online: bool,
}

impl Liveness {
    pub(crate) const fn new(source: &'static str) -> Self {
        Self {
            source,
            online: false,
        }
    }

    /// Record this tick's state; logs only on change.
    pub(crate) fn update(&mut self, online: bool) -> bool {
        if online != self.online {
            if online {
                info!(source = self.source, "feedback online");
            } else {
                warn!(source = self.source, "feedback lost");
            }
            self.online = online;
        }
        online
    }
}

/// Failure to bring the control tasks up.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error(transparent)]
    Build(#[from] ControlError),
    #[error(transparent)]
    Spawn(#[from] CycleError),
}

/// Build every control task from the runtime's configuration and spawn it.
pub fn spawn_control_tasks(rt: &Arc<Runtime>) -> Result<Vec<TaskHandle>, StartError> {
    let cfg = &rt.config;
    let tasks = &cfg.tasks;

    // Build all before spawning any, so a bad table starts nothing.
    let cmd = CmdTask::new(cfg)?;
    let cap = CapTask::new(cfg)?;
    let chassis = ChassisTask::new(cfg)?;
    let gimbal = GimbalTask::new(cfg)?;
    let launcher = LauncherTask::new(cfg)?;

    let mut handles = Vec::with_capacity(5);
    handles.push(spawn_task(cmd, Arc::clone(rt), tasks.cmd)?);
    handles.push(spawn_task(cap, Arc::clone(rt), tasks.cap)?);
    handles.push(spawn_task(chassis, Arc::clone(rt), tasks.chassis)?);
    handles.push(spawn_task(gimbal, Arc::clone(rt), tasks.gimbal)?);
    handles.push(spawn_task(launcher, Arc::clone(rt), tasks.launcher)?);
    Ok(handles)
}
