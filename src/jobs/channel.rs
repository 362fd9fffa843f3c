//! Per-job progress channel
//!
//! Single producer, single consumer, unbounded and FIFO. The end of a job's
//! sequence is signalled by closing the channel: once every sender is dropped
//! the receiver yields `None`.

use crate::types::ProgressEvent;
use tokio::sync::mpsc;

/// Create a fresh progress channel for one job
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressSender { tx },
        ProgressReceiver {
            rx,
            finished: false,
        },
    )
}

/// Producing half, held by the job's worker
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    /// Push an event; returns false when nobody is listening any more
    pub fn send(&self, event: ProgressEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Consuming half, read once by the response stream
///
/// Stops after the first terminal event, so a consumer never sees anything
/// past a job's `Result` or `Error` even if a sender is still alive.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
    finished: bool,
}

impl ProgressReceiver {
    /// Wait for the next event; `None` once the job's sequence is over
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        if self.finished {
            return None;
        }

        let event = self.rx.recv().await;
        match &event {
            Some(event) if event.is_terminal() => self.finish(),
            None => self.finished = true,
            Some(_) => {}
        }
        event
    }

    fn finish(&mut self) {
        self.finished = true;
        self.rx.close();
    }
}
