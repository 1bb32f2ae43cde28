//! Upload error types.

/// Local failures while preparing a chunk for transmission.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("transfer error: {0}")]
    Transfer(#[from] filedrop_transfer::TransferError),

    #[error("read task failed: {0}")]
    Join(String),
}
