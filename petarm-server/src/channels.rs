//! Handler to arm-worker communication
//!
//! The controller lives on a single worker thread. HTTP handlers never touch
//! it directly: they queue an [`ArmCommand`] and wait for the reply, so two
//! requests can never interleave register writes on the chip.

use std::fmt;

use petarm_core::PickRequest;
use tokio::sync::{mpsc, oneshot};

/// Pending commands before senders start waiting
pub const ARM_QUEUE_DEPTH: usize = 4;

/// Work for the arm task
#[derive(Debug)]
pub enum ArmCommand {
    /// Run the pick gesture and report how it went
    Pick {
        request: PickRequest,
        reply: oneshot::Sender<Result<(), ArmFault>>,
    },
}

/// A gesture aborted by an output failure
///
/// Carries the rendered driver error; the driver error type itself stays on
/// the worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmFault(pub String);

impl fmt::Display for ArmFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ArmFault {}

/// Why a pick request did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    /// The arm task is gone
    Unavailable,
    /// The gesture started but the hardware failed partway
    Fault(ArmFault),
}

impl fmt::Display for PickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("arm is not available"),
            Self::Fault(fault) => write!(f, "arm fault: {fault}"),
        }
    }
}

impl std::error::Error for PickError {}

/// Cloneable sending side of the arm command queue
#[derive(Debug, Clone)]
pub struct ArmHandle {
    tx: mpsc::Sender<ArmCommand>,
}

impl ArmHandle {
    /// Create the queue; the receiver goes to the arm task
    pub fn channel() -> (Self, mpsc::Receiver<ArmCommand>) {
        let (tx, rx) = mpsc::channel(ARM_QUEUE_DEPTH);
        (Self { tx }, rx)
    }

    /// Queue a pick gesture and wait for it to finish
    pub async fn pick(&self, request: PickRequest) -> Result<(), PickError> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(ArmCommand::Pick { request, reply })
            .await
            .map_err(|_| PickError::Unavailable)?;

        done.await
            .map_err(|_| PickError::Unavailable)?
            .map_err(PickError::Fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pick_without_worker_is_unavailable() {
        let (handle, commands) = ArmHandle::channel();
        drop(commands);

        let result = handle.pick(PickRequest::new(0.0, 1.0)).await;
        assert_eq!(result, Err(PickError::Unavailable));
    }

    #[tokio::test]
    async fn test_pick_forwards_request_and_reply() {
        let (handle, mut commands) = ArmHandle::channel();

        let worker = tokio::spawn(async move {
            let Some(ArmCommand::Pick { request, reply }) = commands.recv().await else {
                panic!("expected a pick command");
            };
            assert_eq!(request, PickRequest::new(0.25, 0.75));
            reply.send(Err(ArmFault("bus down".into()))).unwrap();
        });

        let result = handle.pick(PickRequest::new(0.25, 0.75)).await;
        assert_eq!(result, Err(PickError::Fault(ArmFault("bus down".into()))));
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_reply_is_unavailable() {
        let (handle, mut commands) = ArmHandle::channel();

        let worker = tokio::spawn(async move {
            // Worker dies mid-command
            drop(commands.recv().await);
        });

        let result = handle.pick(PickRequest::new(0.0, 0.0)).await;
        assert_eq!(result, Err(PickError::Unavailable));
        worker.await.unwrap();
    }
}
