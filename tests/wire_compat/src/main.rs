fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use filedrop_protocol::{
        ErrorResponse, FileListResponse, SearchResponse, UploadPartResponse, UploadProgress,
        UploadStatus,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (key order is irrelevant).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  service: {fixture}\n  Rust:    {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_files_list() {
        let resp: FileListResponse = roundtrip_test("files_list.json");
        assert_eq!(
            resp.into_files(),
            vec!["notes.txt", "report.pdf", "holiday photo.jpg"]
        );
    }

    #[test]
    fn fixture_files_empty_message() {
        let resp: FileListResponse = roundtrip_test("files_empty_message.json");
        assert!(resp.files.is_none());
        assert!(resp.into_files().is_empty());
    }

    #[test]
    fn fixture_search_result() {
        let resp: SearchResponse = roundtrip_test("search_result.json");
        assert_eq!(resp.matching_files.len(), 2);
    }

    #[test]
    fn fixture_upload_part_response() {
        let resp: UploadPartResponse = roundtrip_test("upload_part_response.json");
        assert_eq!(resp.filename, "report.pdf");
    }

    #[test]
    fn fixture_error_detail() {
        let resp: ErrorResponse = roundtrip_test("error_detail.json");
        assert_eq!(resp.detail, "File not found");
    }

    #[test]
    fn fixture_upload_progress_failed() {
        let progress: UploadProgress = roundtrip_test("upload_progress_failed.json");
        assert_eq!(progress.status, UploadStatus::Failed);
        assert_eq!(progress.failed_chunks, vec![1]);
        assert_eq!(progress.completed_chunks, 1);
    }

    #[test]
    fn all_fixtures_are_covered() {
        let mut names: Vec<String> = fs::read_dir(fixtures_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "error_detail.json",
                "files_empty_message.json",
                "files_list.json",
                "search_result.json",
                "upload_part_response.json",
                "upload_progress_failed.json",
            ]
        );
    }
}
