//! Runtime bridge between UI command queue and backend event intake.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::{fetch_timeline, TimelineApi};
use crossbeam_channel::{Receiver, Sender};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};

/// Spawns the worker thread. Commands are handled one at a time, so fetch
/// cycles never overlap. The thread exits once every command sender is gone.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    api: Arc<dyn TimelineApi>,
    runtime: Handle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::FetchTimeline { generation } => {
                        let event = match fetch_timeline(api.as_ref()).await {
                            Ok(entries) => UiEvent::TimelineFetched {
                                generation,
                                entries,
                            },
                            Err(err) => {
                                warn!(generation, "timeline fetch failed: {err}");
                                UiEvent::TimelineUnavailable {
                                    generation,
                                    error: UiError::from_fetch_error(&err),
                                }
                            }
                        };

                        if ui_tx.send(event).is_err() {
                            debug!(generation, "display is gone; dropping timeline result");
                        }
                    }
                }
            }
            debug!("backend command queue closed; worker exiting");
        });
    })
}
