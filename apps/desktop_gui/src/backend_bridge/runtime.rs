//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{run_load, run_submission, ClassifierBackend};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Serves UI commands on a dedicated tokio runtime. Each command runs in its
/// own task, so replies reach the UI in completion order, not issue order.
pub fn launch(
    backend: Arc<dyn ClassifierBackend>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                let backend = Arc::clone(&backend);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = match cmd {
                        BackendCommand::LoadOptions(request) => {
                            UiEvent::OptionsLoaded(run_load(backend.as_ref(), request).await)
                        }
                        BackendCommand::Classify(submission) => {
                            let (ticket, result) =
                                run_submission(backend.as_ref(), submission).await;
                            UiEvent::Classified { ticket, result }
                        }
                    };
                    deliver(ui_tx, event).await;
                });
            }
            tracing::debug!("ui command queue closed; backend worker exiting");
        });
    });
}

/// Hands a reply to the UI. A full queue parks the reply on the blocking pool
/// until the UI drains it; only a closed UI loses it.
async fn deliver(ui_tx: Sender<UiEvent>, event: UiEvent) {
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            tracing::debug!("ui event queue full; waiting to deliver backend reply");
            let sent = tokio::task::spawn_blocking(move || ui_tx.send(event)).await;
            if !matches!(sent, Ok(Ok(()))) {
                tracing::warn!("ui event queue closed; dropping backend reply");
            }
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::warn!("ui event queue closed; dropping backend reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::bounded;

    use super::*;

    fn info(event: UiEvent) -> Option<String> {
        match event {
            UiEvent::Info(message) => Some(message),
            _ => None,
        }
    }

    #[tokio::test]
    async fn full_ui_queue_delays_the_reply_instead_of_dropping_it() {
        let (ui_tx, ui_rx) = bounded(1);
        ui_tx
            .try_send(UiEvent::Info("first".to_string()))
            .expect("fill queue");

        let delivery = tokio::spawn(deliver(ui_tx, UiEvent::Info("second".to_string())));
        let received = tokio::task::spawn_blocking(move || {
            (0..2)
                .filter_map(|_| ui_rx.recv_timeout(Duration::from_secs(5)).ok())
                .filter_map(info)
                .collect::<Vec<_>>()
        })
        .await
        .expect("drain");
        delivery.await.expect("delivery task");

        assert_eq!(received, vec!["first", "second"]);
    }
}
