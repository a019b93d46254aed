//! UI surface to orchestrator transport.

use std::sync::Arc;

use async_trait::async_trait;
use automator_protocols::{ChannelError, ControlCommand, ControlHandler, ControlReply};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

type ControlEnvelope = (ControlCommand, oneshot::Sender<ControlReply>);

/// Sends control commands to a served [`ControlHandler`].
#[derive(Clone)]
pub struct ControlClient {
    sender: mpsc::Sender<ControlEnvelope>,
}

impl ControlClient {
    /// Send `command` and await its reply.
    pub async fn send(&self, command: ControlCommand) -> Result<ControlReply, ChannelError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send((command, tx))
            .await
            .map_err(|_| ChannelError::Unreachable("orchestrator is not running".to_string()))?;

        rx.await
            .map_err(|_| ChannelError::Unreachable("orchestrator dropped the command".to_string()))
    }
}

/// A client is itself a handler, so surfaces written against
/// [`ControlHandler`] can sit on either side of the channel.
#[async_trait]
impl ControlHandler for ControlClient {
    async fn handle(&self, command: ControlCommand) -> ControlReply {
        match self.send(command).await {
            Ok(reply) => reply,
            Err(e) => ControlReply::failed(e.to_string()),
        }
    }
}

/// Serve `handler` on a fresh control channel.
///
/// Each command is handled on its own task so a slow command (export) does
/// not hold up state polling.
pub fn serve_control(
    handler: Arc<dyn ControlHandler>,
    capacity: usize,
) -> (ControlClient, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<ControlEnvelope>(capacity.max(1));

    let task = tokio::spawn(async move {
        while let Some((command, reply)) = receiver.recv().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let outcome = handler.handle(command).await;
                let _ = reply.send(outcome);
            });
        }
        debug!("Control channel closed");
    });

    (ControlClient { sender }, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use automator_protocols::JobKind;

    struct EchoHandler;

    #[async_trait]
    impl ControlHandler for EchoHandler {
        async fn handle(&self, command: ControlCommand) -> ControlReply {
            match command {
                ControlCommand::Pause { kind: JobKind::Media } => ControlReply::ok(),
                _ => ControlReply::failed("unsupported"),
            }
        }
    }

    #[tokio::test]
    async fn test_control_round_trip() {
        let (client, _task) = serve_control(Arc::new(EchoHandler), 8);

        let reply = client
            .send(ControlCommand::Pause { kind: JobKind::Media })
            .await
            .unwrap();
        assert!(reply.success);

        let reply = client
            .send(ControlCommand::Stop { kind: JobKind::Edit })
            .await
            .unwrap();
        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("unsupported"));
    }

    #[tokio::test]
    async fn test_control_unreachable_after_shutdown() {
        let (client, task) = serve_control(Arc::new(EchoHandler), 8);
        task.abort();
        let _ = task.await;

        let err = client
            .send(ControlCommand::GetState { kind: JobKind::Media })
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_client_as_handler_reports_transport_failure() {
        let (client, task) = serve_control(Arc::new(EchoHandler), 8);

        let reply = client
            .handle(ControlCommand::Pause { kind: JobKind::Media })
            .await;
        assert!(reply.success);

        task.abort();
        let _ = task.await;

        let reply = client
            .handle(ControlCommand::Pause { kind: JobKind::Media })
            .await;
        assert!(!reply.success);
        assert!(reply.error.is_some());
    }
}
