//! HTTP client for the filedrop storage service.
//!
//! Covers the four service operations: chunk upload, listing, search and
//! download. [`StorageClient`] also implements
//! [`filedrop_upload::ChunkTransmitter`], so it can be handed straight to an
//! [`filedrop_upload::UploadSequencer`].

pub mod client;

pub use client::{DownloadedFile, Error, StorageClient};
