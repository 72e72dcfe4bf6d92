//! Arm task
//!
//! Owns the controller and executes queued commands one at a time until
//! every [`ArmHandle`](crate::channels::ArmHandle) is dropped.

use std::fmt;
use std::io;
use std::thread::{self, JoinHandle};

use embedded_hal::delay::DelayNs;
use log::{debug, error, info};
use petarm_core::traits::ServoOutput;
use petarm_core::ArmController;
use tokio::sync::mpsc;

use crate::channels::{ArmCommand, ArmFault};

/// Start the arm task on a dedicated thread named `arm`
pub fn spawn_arm_task<S, D>(
    arm: ArmController<S, D>,
    commands: mpsc::Receiver<ArmCommand>,
) -> io::Result<JoinHandle<()>>
where
    S: ServoOutput + Send + 'static,
    S::Error: fmt::Display,
    D: DelayNs + Send + 'static,
{
    thread::Builder::new()
        .name("arm".into())
        .spawn(move || arm_task(arm, commands))
}

/// Command loop; must not be called from inside an async runtime
fn arm_task<S, D>(mut arm: ArmController<S, D>, mut commands: mpsc::Receiver<ArmCommand>)
where
    S: ServoOutput,
    S::Error: fmt::Display,
    D: DelayNs,
{
    info!(
        "Arm task started at {:?} (settle {} ms)",
        arm.pose(),
        arm.config().settle_ms
    );

    while let Some(command) = commands.blocking_recv() {
        match command {
            ArmCommand::Pick { request, reply } => {
                let result = request.run(&mut arm).map_err(|e| {
                    error!("Pick gesture aborted: {}", e);
                    ArmFault(e.to_string())
                });
                debug!("Arm at {:?}", arm.pose());

                if reply.send(result).is_err() {
                    debug!("Pick requester left before the gesture finished");
                }
            }
        }
    }

    info!("Arm task stopped");
}
