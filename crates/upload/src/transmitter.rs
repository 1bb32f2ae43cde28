//! Chunk transmitter contract.
//!
//! `ChunkTransmitter` is implemented by the HTTP client. Keeping it a trait
//! lets the sequencer be tested with instrumented mocks.

use std::future::Future;
use std::pin::Pin;

use filedrop_transfer::ChunkDescriptor;

/// Failure of a single chunk transmission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransmitError {
    /// Connection refused, timeout, non-success status, unreadable response.
    #[error("network error: {0}")]
    Network(String),
}

/// One chunk ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkUpload {
    /// Name of the file on the service. The service appends to it.
    pub target: String,
    pub chunk: ChunkDescriptor,
    pub total_chunks: usize,
    /// Exactly the bytes of `chunk`.
    pub data: Vec<u8>,
}

/// Future returned by [`ChunkTransmitter::send`].
pub type TransmitFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransmitError>> + Send + 'a>>;

/// Sends one chunk as one request.
///
/// Implementations perform exactly one request per call, never retry, and
/// report every transport failure as [`TransmitError::Network`].
pub trait ChunkTransmitter: Send + Sync {
    fn send(&self, upload: ChunkUpload) -> TransmitFuture<'_>;
}
