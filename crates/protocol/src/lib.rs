//! Wire types for the filedrop storage service.
//!
//! The storage service is an external HTTP collaborator; this crate only
//! describes the endpoints it exposes and the JSON bodies it returns.

pub mod constants;
pub mod messages;
pub mod types;

pub use constants::Endpoint;
pub use messages::{ErrorResponse, FileListResponse, SearchResponse, UploadPartResponse};
pub use types::{UploadProgress, UploadStatus};
