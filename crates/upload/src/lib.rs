//! Sequential chunked upload.
//!
//! This crate holds the upload **business logic**: it plans a file into
//! chunks, hands them one at a time to a [`ChunkTransmitter`], and applies a
//! [`FailurePolicy`] when a chunk fails. It has no HTTP dependency; the
//! client crate implements the transmitter on top of the storage service.
//!
//! # Ordering
//!
//! The service reassembles a file by appending chunks in arrival order, so
//! chunk `k + 1` is never read or sent before chunk `k`'s outcome is known.

pub mod error;
pub mod sequencer;
pub mod transmitter;
pub mod types;

pub use error::UploadError;
pub use sequencer::UploadSequencer;
pub use transmitter::{ChunkTransmitter, ChunkUpload, TransmitError, TransmitFuture};
pub use types::{FailurePolicy, FailureReason, UploadEvent, UploadOutcome, UploadReport};
