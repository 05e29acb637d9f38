//! Running detection requests off the UI thread.

use std::{
    sync::{Arc, mpsc},
    thread,
};

use emotion_core::{DetectionClient, DetectionError, PendingCapture};
use log::error;

use crate::types::JobMessage;

/// Send `pending` to `client` on a worker thread.
///
/// The result always comes back as a [`JobMessage::DetectionFinished`]
/// carrying the capture's ticket, even when the thread cannot be spawned.
pub fn spawn_detection(
    client: Arc<dyn DetectionClient>,
    pending: PendingCapture,
    job_tx: mpsc::Sender<JobMessage>,
    repaint: egui::Context,
) {
    let ticket = pending.ticket;
    let fallback_tx = job_tx.clone();
    let spawned = thread::Builder::new()
        .name(format!("emotion-detect-{}", ticket.sequence))
        .spawn(move || {
            let result = client.detect(&pending.photo);
            let _ = job_tx.send(JobMessage::DetectionFinished { ticket, result });
            repaint.request_repaint();
        });

    if let Err(err) = spawned {
        error!("Failed to spawn detection worker: {err}");
        let _ = fallback_tx.send(JobMessage::DetectionFinished {
            ticket,
            result: Err(DetectionError::Request(format!(
                "could not start detection worker: {err}"
            ))),
        });
    }
}
