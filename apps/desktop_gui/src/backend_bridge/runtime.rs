//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{FetchRequest, Services, Settings};
use crossbeam_channel::{Receiver, Sender};
use tokio::task::JoinHandle;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let services = match Services::from_settings(&settings) {
            Ok(services) => services,
            Err(err) => {
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: invalid service configuration: {err:#}"),
                )));
                tracing::error!("invalid service configuration: {err:#}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            let mut city_task: Option<JoinHandle<()>> = None;
            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend: command received");
                match cmd {
                    BackendCommand::Fetch { epoch, request } => {
                        let superseding = matches!(request, FetchRequest::Cities { .. });
                        let services = services.clone();
                        let ui_tx = ui_tx.clone();
                        let task = tokio::spawn(async move {
                            let outcome = services.fetch(request).await;
                            deliver(ui_tx, UiEvent::Fetched { epoch, outcome }).await;
                        });

                        if superseding {
                            if let Some(previous) = city_task.replace(task) {
                                previous.abort();
                            }
                        }
                    }
                    BackendCommand::Submit { epoch, request } => {
                        let services = services.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            tracing::info!(name = %request.name, "backend: submitting collect point");
                            let result = services.submit(&request).await;
                            deliver(ui_tx, UiEvent::SubmitFinished { epoch, result }).await;
                        });
                    }
                }
            }
            tracing::info!("backend: command queue closed, worker exiting");
        });
    });
}

/// Hands a backend result to the UI, waiting for queue space instead of
/// dropping it. The wait runs on the blocking pool.
async fn deliver(ui_tx: Sender<UiEvent>, event: UiEvent) {
    match tokio::task::spawn_blocking(move || ui_tx.send(event)).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => tracing::warn!("backend: ui event queue closed, result dropped"),
        Err(err) => tracing::error!("backend: result delivery failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use client_core::FormState;
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn submit_result_waits_for_a_full_ui_queue() {
        let settings = Settings {
            api_base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_seconds: 2,
            ..Settings::default()
        };
        let (cmd_tx, cmd_rx) = bounded(4);
        // Filled by the worker's own "starting" and "ready" notices.
        let (ui_tx, ui_rx) = bounded(2);
        launch(settings, cmd_rx, ui_tx);

        cmd_tx
            .send(BackendCommand::Submit {
                epoch: 7,
                request: FormState::default().payload(),
            })
            .expect("queue submit");
        std::thread::sleep(Duration::from_millis(500));

        let deadline = Instant::now() + Duration::from_secs(15);
        let mut finished = None;
        while Instant::now() < deadline {
            match ui_rx.recv_timeout(Duration::from_millis(200)) {
                Ok(UiEvent::SubmitFinished { epoch, result }) => {
                    finished = Some((epoch, result));
                    break;
                }
                Ok(_) | Err(_) => {}
            }
        }

        let (epoch, result) = finished.expect("submit result delivered");
        assert_eq!(epoch, 7);
        assert!(result.is_err());
    }
}
