//! Chunked upload building blocks: planning, byte sources, session state
//! and speed tracking.

mod plan;
mod progress;
mod source;
mod types;
mod validation;

pub use plan::{ChunkDescriptor, ChunkPlan, chunk_count, plan};
pub use progress::SpeedCalculator;
pub use source::{ByteSource, FileSource, MemorySource};
pub use types::{SessionState, UploadSession};
pub use validation::validate_file_name;

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("chunk {index} is outside the source ({end} > {size})")]
    OutOfRange { index: usize, end: u64, size: u64 },

    #[error("session not active: {0}")]
    SessionNotActive(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),
}
