use filedrop_protocol::types::{UploadProgress, UploadStatus};

use crate::TransferError;
use crate::plan::{ChunkDescriptor, chunk_count};

/// Where an upload session is in its lifecycle.
///
/// `Idle → Sending(i) → { Sending(i + 1) | Failed(i) | Completed }`, with
/// `Cancelled` reachable from any non-terminal state. Terminal states never
/// transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending { index: usize },
    Completed,
    Failed { index: usize },
    Cancelled,
}

impl SessionState {
    /// Returns `true` for `Completed`, `Failed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed { .. } | SessionState::Cancelled
        )
    }
}

/// In-memory progress of one file's chunked upload.
///
/// Owned and mutated by a single sequencer; it is never persisted, and a new
/// upload of the same file starts a fresh session at offset 0.
#[derive(Debug, Clone)]
pub struct UploadSession {
    id: String,
    target: String,
    total_bytes: u64,
    total_chunks: usize,
    state: SessionState,
    /// Index of the next chunk allowed to start.
    next_index: usize,
    next_offset: u64,
    completed_chunks: usize,
    transferred_bytes: u64,
    failed_chunks: Vec<usize>,
    error: String,
}

impl UploadSession {
    /// Creates an idle session for `total_bytes` split into `chunk_size` pieces.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(target: &str, total_bytes: u64, chunk_size: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            target: target.to_string(),
            total_bytes,
            total_chunks: chunk_count(total_bytes, chunk_size),
            state: SessionState::Idle,
            next_index: 0,
            next_offset: 0,
            completed_chunks: 0,
            transferred_bytes: 0,
            failed_chunks: Vec::new(),
            error: String::new(),
        }
    }

    /// Marks `chunk` as in flight.
    ///
    /// Fails if the session is terminal or if `chunk` is not the next one in
    /// order, which also rejects starting a chunk before the previous
    /// chunk's outcome was recorded.
    pub fn begin_chunk(&mut self, chunk: &ChunkDescriptor) -> Result<(), TransferError> {
        self.ensure_not_terminal()?;
        if chunk.index != self.next_index || chunk.start != self.next_offset {
            return Err(TransferError::SessionNotActive(format!(
                "{}: chunk {} started out of order (expected {} at offset {})",
                self.id, chunk.index, self.next_index, self.next_offset
            )));
        }
        self.state = SessionState::Sending { index: chunk.index };
        Ok(())
    }

    /// Records a successful transmission of the in-flight chunk.
    pub fn record_success(&mut self, chunk: &ChunkDescriptor) -> Result<(), TransferError> {
        self.ensure_in_flight(chunk)?;
        self.completed_chunks += 1;
        self.transferred_bytes += chunk.len();
        self.advance_past(chunk);
        Ok(())
    }

    /// Records a failed transmission that the caller chose to skip over.
    pub fn record_skipped(
        &mut self,
        chunk: &ChunkDescriptor,
        reason: &str,
    ) -> Result<(), TransferError> {
        self.ensure_in_flight(chunk)?;
        self.failed_chunks.push(chunk.index);
        self.error = reason.to_string();
        self.advance_past(chunk);
        Ok(())
    }

    /// Moves to the terminal `Completed` state once every chunk has an outcome.
    pub fn complete(&mut self) -> Result<(), TransferError> {
        self.ensure_not_terminal()?;
        if self.next_index != self.total_chunks {
            return Err(TransferError::SessionNotActive(format!(
                "{}: {} of {} chunks still pending",
                self.id,
                self.total_chunks - self.next_index,
                self.total_chunks
            )));
        }
        self.state = SessionState::Completed;
        Ok(())
    }

    /// Moves to the terminal `Failed` state at chunk `index`.
    pub fn fail(&mut self, index: usize, reason: &str) -> Result<(), TransferError> {
        self.ensure_not_terminal()?;
        if !self.failed_chunks.contains(&index) {
            self.failed_chunks.push(index);
        }
        self.error = reason.to_string();
        self.state = SessionState::Failed { index };
        Ok(())
    }

    /// Moves to the terminal `Cancelled` state.
    pub fn cancel(&mut self) -> Result<(), TransferError> {
        self.ensure_not_terminal()?;
        self.state = SessionState::Cancelled;
        Ok(())
    }

    /// Returns a serializable snapshot.
    pub fn progress(&self) -> UploadProgress {
        let status = match self.state {
            SessionState::Idle => UploadStatus::Pending,
            SessionState::Sending { .. } => UploadStatus::InProgress,
            SessionState::Completed => UploadStatus::Completed,
            SessionState::Failed { .. } => UploadStatus::Failed,
            SessionState::Cancelled => UploadStatus::Cancelled,
        };
        UploadProgress {
            upload_id: self.id.clone(),
            target: self.target.clone(),
            status,
            total_bytes: self.total_bytes,
            transferred_bytes: self.transferred_bytes,
            total_chunks: self.total_chunks,
            completed_chunks: self.completed_chunks,
            failed_chunks: self.failed_chunks.clone(),
            error: self.error.clone(),
        }
    }

    /// Returns `true` while the session can still make progress.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Offset of the first byte not yet handed to the transmitter.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub fn completed_chunks(&self) -> usize {
        self.completed_chunks
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    pub fn failed_chunks(&self) -> &[usize] {
        &self.failed_chunks
    }

    fn advance_past(&mut self, chunk: &ChunkDescriptor) {
        self.next_index = chunk.index + 1;
        self.next_offset = chunk.end;
    }

    fn ensure_not_terminal(&self) -> Result<(), TransferError> {
        if self.state.is_terminal() {
            return Err(TransferError::SessionNotActive(format!(
                "{} is {:?}",
                self.id, self.state
            )));
        }
        Ok(())
    }

    fn ensure_in_flight(&self, chunk: &ChunkDescriptor) -> Result<(), TransferError> {
        match self.state {
            SessionState::Sending { index }
                if index == chunk.index && self.next_index == chunk.index =>
            {
                Ok(())
            }
            _ => Err(TransferError::SessionNotActive(format!(
                "{}: chunk {} is not in flight ({:?})",
                self.id, chunk.index, self.state
            ))),
        }
    }
}
