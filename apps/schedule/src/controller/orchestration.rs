//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), UiError> {
    let cmd_name = match &cmd {
        BackendCommand::FetchTimeline { .. } => "fetch_timeline",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(UiError::new(
            UiErrorCategory::Unknown,
            UiErrorContext::Dispatch,
            "UI command queue is full; please retry",
        )),
        Err(TrySendError::Disconnected(_)) => Err(UiError::new(
            UiErrorCategory::Unknown,
            UiErrorContext::BackendStartup,
            "Backend command processor disconnected (possible startup/runtime failure)",
        )),
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn queues_command_when_worker_is_listening() {
        let (tx, rx) = bounded(1);
        dispatch_backend_command(&tx, BackendCommand::FetchTimeline { generation: 1 })
            .expect("queued");
        assert!(matches!(
            rx.try_recv(),
            Ok(BackendCommand::FetchTimeline { generation: 1 })
        ));
    }

    #[test]
    fn full_queue_is_reported() {
        let (tx, _rx) = bounded(1);
        dispatch_backend_command(&tx, BackendCommand::FetchTimeline { generation: 1 })
            .expect("first");
        let err = dispatch_backend_command(&tx, BackendCommand::FetchTimeline { generation: 2 })
            .expect_err("queue full");
        assert_eq!(err.context(), UiErrorContext::Dispatch);
    }

    #[test]
    fn missing_worker_is_reported() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let err = dispatch_backend_command(&tx, BackendCommand::FetchTimeline { generation: 1 })
            .expect_err("disconnected");
        assert_eq!(err.context(), UiErrorContext::BackendStartup);
    }
}
