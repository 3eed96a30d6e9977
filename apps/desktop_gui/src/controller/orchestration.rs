//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
        }
    }
}

pub fn dispatch_all(
    cmd_tx: &Sender<BackendCommand>,
    cmds: impl IntoIterator<Item = BackendCommand>,
    status: &mut String,
) {
    for cmd in cmds {
        dispatch_backend_command(cmd_tx, cmd, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::FetchRequest;
    use crossbeam_channel::bounded;

    #[test]
    fn reports_full_queue_in_status() {
        let (tx, _rx) = bounded(1);
        let mut status = String::new();
        dispatch_all(
            &tx,
            [
                BackendCommand::Fetch {
                    epoch: 1,
                    request: FetchRequest::Items,
                },
                BackendCommand::Fetch {
                    epoch: 1,
                    request: FetchRequest::States,
                },
            ],
            &mut status,
        );
        assert!(status.contains("queue is full"));
    }

    #[test]
    fn reports_disconnected_worker_in_status() {
        let (tx, rx) = bounded(4);
        drop(rx);
        let mut status = String::new();
        dispatch_backend_command(
            &tx,
            BackendCommand::Fetch {
                epoch: 1,
                request: FetchRequest::Location,
            },
            &mut status,
        );
        assert!(status.contains("disconnected"));
    }
}
