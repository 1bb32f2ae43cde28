//! Storage service client.
//!
//! Async HTTP client using `reqwest`. Every operation is a single request;
//! nothing is retried here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use filedrop_protocol::constants::{
    PART_NUMBER_FIELD, SEARCH_QUERY_PARAM, TOTAL_PARTS_FIELD, UPLOAD_FILE_FIELD,
};
use filedrop_protocol::{Endpoint, ErrorResponse, FileListResponse, SearchResponse, UploadPartResponse};
use filedrop_transfer::{TransferError, validate_file_name};
use filedrop_upload::{ChunkTransmitter, ChunkUpload, TransmitError, TransmitFuture};
use futures_util::StreamExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::multipart::{Form, Part};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Characters escaped in a path segment; unreserved characters stay as-is.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Errors from the storage client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("search pattern must not be empty")]
    EmptyQuery,
}

/// A file written to disk by [`StorageClient::download`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Client for one storage service instance.
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
}

impl StorageClient {
    /// Creates a client for the service at `base_url` (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_timeout(base_url, None)
    }

    /// Creates a client whose requests time out after `timeout`.
    ///
    /// An expired timeout surfaces as [`Error::Http`], and as a network
    /// error when the client is used as a chunk transmitter.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let parsed =
            reqwest::Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{base_url}: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// URL a browser would navigate to in order to download `name`.
    pub fn download_url(&self, name: &str) -> Result<String, Error> {
        validate_file_name(name)?;
        let encoded = utf8_percent_encode(name, PATH_SEGMENT);
        Ok(format!("{}{encoded}", self.url(Endpoint::Download)))
    }

    /// Performs a GET request and returns the body of a success response.
    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<u8>, Error> {
        let resp = self.http.get(url).query(params).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Lists every stored file.
    ///
    /// An empty store yields an empty list.
    pub async fn list_files(&self) -> Result<Vec<String>, Error> {
        let body = self.get(&self.url(Endpoint::Files), &[]).await?;
        let resp: FileListResponse = serde_json::from_slice(&body)?;
        let files = resp.into_files();
        debug!(count = files.len(), "listed files");
        Ok(files)
    }

    /// Lists stored files whose name contains `pattern` (case-insensitive,
    /// matched by the service).
    ///
    /// No match yields an empty list; the service reports that case as a 404.
    pub async fn search(&self, pattern: &str) -> Result<Vec<String>, Error> {
        if pattern.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let body = match self
            .get(&self.url(Endpoint::Search), &[(SEARCH_QUERY_PARAM, pattern)])
            .await
        {
            Ok(body) => body,
            Err(Error::Api { status: 404, .. }) => {
                debug!(pattern, "no matching files");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let resp: SearchResponse = serde_json::from_slice(&body)?;
        debug!(pattern, count = resp.matching_files.len(), "search complete");
        Ok(resp.matching_files)
    }

    /// Appends one chunk to `upload.target` on the service.
    ///
    /// Sends exactly one multipart request: the chunk bytes under the `file`
    /// field, plus the 1-based `part_number` and `total_parts`.
    pub async fn upload_chunk(&self, upload: ChunkUpload) -> Result<(), Error> {
        let part_number = upload.chunk.part_number();
        let size = upload.data.len();

        let part = Part::bytes(upload.data)
            .file_name(upload.target.clone())
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part(UPLOAD_FILE_FIELD, part)
            .text(PART_NUMBER_FIELD, part_number.to_string())
            .text(TOTAL_PARTS_FIELD, upload.total_chunks.to_string());

        let resp = self
            .http
            .post(self.url(Endpoint::Upload))
            .multipart(form)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        // The body is informational only.
        let body = resp.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<UploadPartResponse>(&body)
            .map(|r| r.message)
            .unwrap_or_default();
        debug!(
            file = %upload.target,
            part = part_number,
            total = upload.total_chunks,
            bytes = size,
            message = %message,
            "chunk accepted"
        );
        Ok(())
    }

    /// Downloads `name` into `dest_dir`, streaming the body to disk.
    ///
    /// The body is written to a hidden `.part` file first and renamed once
    /// complete, so a failed download never leaves a truncated file under
    /// the final name.
    pub async fn download(&self, name: &str, dest_dir: &Path) -> Result<DownloadedFile, Error> {
        let url = self.download_url(name)?;
        let resp = self.http.get(&url).send().await?;
        let resp = check_status(resp).await?;

        let path = dest_dir.join(name);
        let partial = dest_dir.join(format!(".{name}.part"));

        let written = match stream_to_file(resp, &partial).await {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        info!(file = name, path = %path.display(), bytes = written, "download complete");
        Ok(DownloadedFile {
            path,
            bytes: written,
        })
    }
}

impl ChunkTransmitter for StorageClient {
    fn send(&self, upload: ChunkUpload) -> TransmitFuture<'_> {
        Box::pin(async move {
            self.upload_chunk(upload)
                .await
                .map_err(|e| TransmitError::Network(e.to_string()))
        })
    }
}

async fn stream_to_file(resp: reqwest::Response, path: &Path) -> Result<u64, Error> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;
    while let Some(bytes) = stream.next().await {
        let bytes = bytes?;
        file.write_all(&bytes).await?;
        written += bytes.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Turns a non-success response into [`Error::Api`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        body: error_detail(&body),
    })
}

/// Extracts `detail` from a `{"detail": "..."}` body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = StorageClient::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.url(Endpoint::Files), "http://127.0.0.1:8000/files/");
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            StorageClient::new("not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            StorageClient::new("ftp://example.com"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn download_url_encodes_name() {
        let client = StorageClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.download_url("report.pdf").unwrap(),
            "http://localhost:8000/download/report.pdf"
        );
        assert_eq!(
            client.download_url("my report #1.pdf").unwrap(),
            "http://localhost:8000/download/my%20report%20%231.pdf"
        );
    }

    #[test]
    fn download_url_rejects_traversal() {
        let client = StorageClient::new("http://localhost:8000").unwrap();
        assert!(matches!(
            client.download_url("../secret"),
            Err(Error::Transfer(TransferError::InvalidFileName(_)))
        ));
    }

    #[test]
    fn error_detail_prefers_json_detail() {
        assert_eq!(
            error_detail(r#"{"detail":"File not found"}"#),
            "File not found"
        );
        assert_eq!(error_detail("Internal Server Error"), "Internal Server Error");
    }
}
