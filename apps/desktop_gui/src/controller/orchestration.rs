//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the backend worker. On failure `status` explains why and
/// `false` is returned; the command was not sent.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> bool {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure)"
                    .to_string();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use client_core::{Level, LoadRequest, LoadTicket};
    use crossbeam_channel::bounded;

    use super::*;

    fn phases_command() -> BackendCommand {
        BackendCommand::LoadOptions(LoadRequest::Phases {
            ticket: LoadTicket {
                level: Level::ProjectPhase,
                epoch: 1,
            },
            project_type: "Construction".to_string(),
        })
    }

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(1);
        let mut status = String::new();

        assert!(dispatch_backend_command(&cmd_tx, phases_command(), &mut status));
        assert!(!dispatch_backend_command(&cmd_tx, phases_command(), &mut status));
        assert!(status.contains("full"));

        drop(cmd_rx);
        assert!(!dispatch_backend_command(&cmd_tx, phases_command(), &mut status));
        assert!(status.contains("disconnected"));
    }
}
