//! Data types for the upload flow.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use filedrop_protocol::UploadProgress;
use serde::{Deserialize, Serialize};

/// What the sequencer does when a chunk fails to transmit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failed chunk and report `FailedAtChunk`.
    #[default]
    Abort,
    /// Log the failure and keep sending the remaining chunks.
    ///
    /// The stored file will have a gap wherever a chunk was skipped.
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(format!(
                "unknown failure policy '{other}' (expected 'abort' or 'continue')"
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => f.write_str("abort"),
            FailurePolicy::Continue => f.write_str("continue"),
        }
    }
}

/// Why an upload stopped at a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The transmitter reported a transport failure.
    Network(String),
    /// The chunk's bytes could not be read from the local source.
    Read(String),
    /// The session refused a state transition.
    Session(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Network(detail) => write!(f, "network error: {detail}"),
            FailureReason::Read(detail) => write!(f, "read error: {detail}"),
            FailureReason::Session(detail) => write!(f, "session error: {detail}"),
        }
    }
}

/// Terminal result of one upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Completed,
    FailedAtChunk { index: usize, reason: FailureReason },
    Cancelled,
}

impl UploadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, UploadOutcome::Completed)
    }
}

/// Outcome plus the final session snapshot.
///
/// `progress` tells the caller how far the upload got: completed chunk count,
/// bytes sent, and every chunk index that failed (several under
/// [`FailurePolicy::Continue`]).
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    pub outcome: UploadOutcome,
    pub progress: UploadProgress,
}

impl UploadReport {
    /// Number of chunks the service acknowledged.
    pub fn chunks_sent(&self) -> usize {
        self.progress.completed_chunks
    }

    /// Indices of chunks that failed to transmit.
    pub fn failed_chunks(&self) -> &[usize] {
        &self.progress.failed_chunks
    }

    /// `true` only if the outcome is `Completed` and no chunk was skipped.
    pub fn is_intact(&self) -> bool {
        self.outcome.is_completed() && self.progress.failed_chunks.is_empty()
    }
}

/// Event emitted while an upload runs.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started {
        upload_id: String,
        target: String,
        total_chunks: usize,
        total_bytes: u64,
    },
    /// A chunk was acknowledged.
    Progress {
        upload_id: String,
        chunk: usize,
        total_chunks: usize,
        transferred_bytes: u64,
        total_bytes: u64,
        bytes_per_second: f64,
        eta: Option<Duration>,
    },
    /// A chunk failed and was skipped under [`FailurePolicy::Continue`].
    ChunkSkipped {
        upload_id: String,
        chunk: usize,
        error: String,
    },
    Completed {
        upload_id: String,
        target: String,
    },
    Failed {
        upload_id: String,
        target: String,
        chunk: usize,
        error: String,
    },
    Cancelled {
        upload_id: String,
        target: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults_to_abort() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Abort);
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
        assert_eq!(
            "Continue".parse::<FailurePolicy>(),
            Ok(FailurePolicy::Continue)
        );
        assert!("retry".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn policy_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&FailurePolicy::Continue).unwrap(),
            "\"continue\""
        );
        let parsed: FailurePolicy = serde_json::from_str("\"abort\"").unwrap();
        assert_eq!(parsed, FailurePolicy::Abort);
    }

    #[test]
    fn reason_display() {
        let r = FailureReason::Network("connection refused".into());
        assert_eq!(r.to_string(), "network error: connection refused");
    }
}
