//! Upload sequencer.
//!
//! Drives a [`ChunkTransmitter`] across a whole file, strictly one chunk at a
//! time, and publishes progress events. Supports cancellation between chunks.

use std::sync::{Arc, Mutex, PoisonError};

use filedrop_transfer::{ByteSource, ChunkDescriptor, SpeedCalculator, UploadSession, plan};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::UploadError;
use crate::transmitter::{ChunkTransmitter, ChunkUpload, TransmitError};
use crate::types::{FailurePolicy, FailureReason, UploadEvent, UploadOutcome, UploadReport};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Uploads files chunk by chunk through a transmitter.
pub struct UploadSequencer {
    transmitter: Arc<dyn ChunkTransmitter>,
    policy: FailurePolicy,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    cancel: Mutex<CancellationToken>,
}

impl UploadSequencer {
    /// Creates a sequencer with the default [`FailurePolicy::Abort`].
    pub fn new(transmitter: Arc<dyn ChunkTransmitter>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            transmitter,
            policy: FailurePolicy::default(),
            events_tx,
            events_rx: Some(events_rx),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Sets the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Mutex::new(cancel);
        self
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Events are advisory: when the receiver lags behind, excess events are
    /// dropped rather than stalling the upload.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Returns the token the next [`run`](Self::run) checks before every chunk.
    ///
    /// A run that ends `Cancelled` retires its token; call this again to
    /// cancel a later run.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Uploads `source` in `chunk_size` pieces.
    ///
    /// Every call starts a fresh session at offset 0. Chunks are read and
    /// sent in ascending index order, and chunk `k + 1` is never read before
    /// chunk `k`'s transmission has resolved. An empty source completes
    /// without sending anything.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub async fn run(&self, source: Arc<dyn ByteSource>, chunk_size: u64) -> UploadReport {
        let cancel = self.cancel_token();
        let report = self.run_with_cancel(source, chunk_size, &cancel).await;

        if cancel.is_cancelled() {
            let mut current = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
            if current.is_cancelled() {
                *current = CancellationToken::new();
            }
        }
        report
    }

    /// Like [`run`](Self::run), but checks `cancel` instead of the
    /// sequencer's own token.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub async fn run_with_cancel(
        &self,
        source: Arc<dyn ByteSource>,
        chunk_size: u64,
        cancel: &CancellationToken,
    ) -> UploadReport {
        let chunks = plan(source.size(), chunk_size);
        let mut session = UploadSession::new(source.name(), source.size(), chunk_size);
        let mut speed = SpeedCalculator::default();

        info!(
            upload = %session.id(),
            file = %session.target(),
            total_bytes = session.total_bytes(),
            chunks = session.total_chunks(),
            chunk_size,
            policy = %self.policy,
            "upload started"
        );
        self.emit(UploadEvent::Started {
            upload_id: session.id().to_string(),
            target: session.target().to_string(),
            total_chunks: session.total_chunks(),
            total_bytes: session.total_bytes(),
        });

        let outcome = self
            .send_all(&mut session, &mut speed, &source, chunks, cancel)
            .await;
        self.finish(session, outcome)
    }

    async fn send_all(
        &self,
        session: &mut UploadSession,
        speed: &mut SpeedCalculator,
        source: &Arc<dyn ByteSource>,
        chunks: impl Iterator<Item = ChunkDescriptor>,
        cancel: &CancellationToken,
    ) -> UploadOutcome {
        speed.add_sample(0);

        for chunk in chunks {
            if cancel.is_cancelled() {
                return UploadOutcome::Cancelled;
            }

            if let Err(e) = session.begin_chunk(&chunk) {
                return failed_at(&chunk, FailureReason::Session(e.to_string()));
            }

            let data = match read_chunk(source, chunk).await {
                Ok(data) => data,
                Err(e) => return failed_at(&chunk, FailureReason::Read(e.to_string())),
            };

            let upload = ChunkUpload {
                target: session.target().to_string(),
                chunk,
                total_chunks: session.total_chunks(),
                data,
            };

            match self.transmitter.send(upload).await {
                Ok(()) => {
                    if let Err(e) = session.record_success(&chunk) {
                        return failed_at(&chunk, FailureReason::Session(e.to_string()));
                    }
                    speed.add_sample(chunk.len());

                    debug!(
                        upload = %session.id(),
                        chunk = chunk.index,
                        start = chunk.start,
                        end = chunk.end,
                        "chunk sent"
                    );
                    let remaining = session.total_bytes() - session.next_offset();
                    self.emit(UploadEvent::Progress {
                        upload_id: session.id().to_string(),
                        chunk: chunk.index,
                        total_chunks: session.total_chunks(),
                        transferred_bytes: session.transferred_bytes(),
                        total_bytes: session.total_bytes(),
                        bytes_per_second: speed.bytes_per_second(),
                        eta: speed.eta(remaining),
                    });
                }
                Err(TransmitError::Network(detail)) => match self.policy {
                    FailurePolicy::Abort => {
                        return failed_at(&chunk, FailureReason::Network(detail));
                    }
                    FailurePolicy::Continue => {
                        warn!(
                            upload = %session.id(),
                            chunk = chunk.index,
                            error = %detail,
                            "chunk failed, continuing"
                        );
                        if let Err(e) = session.record_skipped(&chunk, &detail) {
                            return failed_at(&chunk, FailureReason::Session(e.to_string()));
                        }
                        self.emit(UploadEvent::ChunkSkipped {
                            upload_id: session.id().to_string(),
                            chunk: chunk.index,
                            error: detail,
                        });
                    }
                },
            }
        }

        UploadOutcome::Completed
    }

    /// Applies the terminal transition, logs it and emits the final event.
    fn finish(&self, mut session: UploadSession, outcome: UploadOutcome) -> UploadReport {
        let upload_id = session.id().to_string();
        let target = session.target().to_string();

        let transition = match &outcome {
            UploadOutcome::Completed => session.complete(),
            UploadOutcome::FailedAtChunk { index, reason } => {
                session.fail(*index, &reason.to_string())
            }
            UploadOutcome::Cancelled => session.cancel(),
        };
        if let Err(e) = transition {
            error!(upload = %upload_id, error = %e, "invalid terminal transition");
        }

        match &outcome {
            UploadOutcome::Completed => {
                info!(
                    upload = %upload_id,
                    file = %target,
                    chunks = session.completed_chunks(),
                    skipped = session.failed_chunks().len(),
                    "upload completed"
                );
                self.emit(UploadEvent::Completed { upload_id, target });
            }
            UploadOutcome::FailedAtChunk { index, reason } => {
                error!(
                    upload = %upload_id,
                    file = %target,
                    chunk = index,
                    sent = session.completed_chunks(),
                    error = %reason,
                    "upload failed"
                );
                self.emit(UploadEvent::Failed {
                    upload_id,
                    target,
                    chunk: *index,
                    error: reason.to_string(),
                });
            }
            UploadOutcome::Cancelled => {
                info!(
                    upload = %upload_id,
                    file = %target,
                    sent = session.completed_chunks(),
                    "upload cancelled"
                );
                self.emit(UploadEvent::Cancelled { upload_id, target });
            }
        }

        UploadReport {
            progress: session.progress(),
            outcome,
        }
    }

    fn emit(&self, event: UploadEvent) {
        match self.events_tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => debug!("event receiver lagging, event dropped"),
        }
    }
}

fn failed_at(chunk: &ChunkDescriptor, reason: FailureReason) -> UploadOutcome {
    UploadOutcome::FailedAtChunk {
        index: chunk.index,
        reason,
    }
}

/// Reads one chunk on the blocking pool.
async fn read_chunk(
    source: &Arc<dyn ByteSource>,
    chunk: ChunkDescriptor,
) -> Result<Vec<u8>, UploadError> {
    let source = Arc::clone(source);
    let data = tokio::task::spawn_blocking(move || source.read_chunk(&chunk))
        .await
        .map_err(|e| UploadError::Join(e.to_string()))??;
    Ok(data)
}
