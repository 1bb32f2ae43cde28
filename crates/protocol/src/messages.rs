use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Body of `GET /files/`.
///
/// The service answers `{"files": [...]}` when the store has content and
/// `{"message": "No files found."}` when it is empty, so both keys are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileListResponse {
    /// Returns the listed names; a message-only body yields an empty list.
    pub fn into_files(self) -> Vec<String> {
        self.files.unwrap_or_default()
    }
}

/// Body of `GET /search/?file_name=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub matching_files: Vec<String>,
}

/// Body returned after a chunk is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPartResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
}

/// Error body returned with non-success statuses (`{"detail": "..."}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_list_with_files() {
        let json = r#"{"files":["a.txt","report.pdf"]}"#;
        let resp: FileListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_files(), vec!["a.txt", "report.pdf"]);
    }

    #[test]
    fn file_list_empty_array() {
        let resp: FileListResponse = serde_json::from_str(r#"{"files":[]}"#).unwrap();
        assert!(resp.into_files().is_empty());
    }

    #[test]
    fn file_list_message_only_is_empty() {
        let json = r#"{"message":"No files found."}"#;
        let resp: FileListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.message.as_deref(), Some("No files found."));
        assert!(resp.into_files().is_empty());
    }

    #[test]
    fn file_list_omits_absent_keys() {
        let resp = FileListResponse {
            files: Some(vec!["x".into()]),
            message: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("message"));
    }

    #[test]
    fn search_response_field_name() {
        let json = r#"{"matching_files":["report.pdf"]}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.matching_files, vec!["report.pdf"]);
    }

    #[test]
    fn search_response_missing_key_defaults_empty() {
        let resp: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.matching_files.is_empty());
    }

    #[test]
    fn upload_part_response_roundtrip() {
        let json = r#"{"message":"Part 1/3 uploaded","filename":"big.iso"}"#;
        let resp: UploadPartResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.filename, "big.iso");
        let back = serde_json::to_string(&resp).unwrap();
        let again: UploadPartResponse = serde_json::from_str(&back).unwrap();
        assert_eq!(resp, again);
    }

    #[test]
    fn error_response_detail() {
        let json = r#"{"detail":"No matching files found."}"#;
        let resp: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.detail, "No matching files found.");
    }
}
