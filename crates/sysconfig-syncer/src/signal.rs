//! Change signal between mutators and the persistence writer.
//!
//! The signal is a single-slot request queue plus an acceptance handshake.
//! [`SignalSender::post`] returns only after the writer has taken the
//! request out of the slot, so at most one pass is ever queued or running
//! and a second post cannot complete before the writer has started on the
//! first. Posts are not coalesced: every accepted request yields one pass.

use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, SyncError};

/// A request for one full persistence pass.
#[derive(Debug)]
pub struct PersistRequest {
    accepted: oneshot::Sender<()>,
}

impl PersistRequest {
    /// Releases the poster. Called by the writer before it starts the pass.
    pub fn accept(self) {
        // The poster may have been cancelled; the pass still runs.
        let _ = self.accepted.send(());
    }
}

/// Mutator side of the signal.
#[derive(Debug, Clone)]
pub struct SignalSender {
    slot: mpsc::Sender<PersistRequest>,
}

impl SignalSender {
    /// Posts a persistence request and waits until the writer accepts it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::WriterStopped`] if the receiving side is gone.
    pub async fn post(&self) -> Result<()> {
        let (accepted, acceptance) = oneshot::channel();
        self.slot
            .send(PersistRequest { accepted })
            .await
            .map_err(|_| SyncError::WriterStopped)?;
        acceptance.await.map_err(|_| SyncError::WriterStopped)
    }
}

/// Writer side of the signal.
#[derive(Debug)]
pub struct SignalReceiver {
    slot: mpsc::Receiver<PersistRequest>,
}

impl SignalReceiver {
    /// Waits for the next request and accepts it.
    ///
    /// Returns `false` once every [`SignalSender`] has been dropped.
    pub async fn accept(&mut self) -> bool {
        match self.slot.recv().await {
            Some(request) => {
                request.accept();
                true
            }
            None => false,
        }
    }
}

/// Creates a connected sender/receiver pair.
#[must_use]
pub fn change_signal() -> (SignalSender, SignalReceiver) {
    let (slot_tx, slot_rx) = mpsc::channel(1);
    (
        SignalSender { slot: slot_tx },
        SignalReceiver { slot: slot_rx },
    )
}
