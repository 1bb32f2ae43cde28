/// HTTP endpoints exposed by the storage service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /upload/`: appends one multipart chunk to the named file.
    Upload,
    /// `GET /download/{name}`: streams a stored file.
    Download,
    /// `GET /search/?file_name=`: case-insensitive substring match.
    Search,
    /// `GET /files/`: lists every stored file.
    Files,
}

impl Endpoint {
    /// Returns the request path (with trailing slash where the service expects one).
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Upload => "/upload/",
            Endpoint::Download => "/download/",
            Endpoint::Search => "/search/",
            Endpoint::Files => "/files/",
        }
    }
}

/// Multipart field carrying the chunk bytes.
pub const UPLOAD_FILE_FIELD: &str = "file";

/// Multipart field carrying the 1-based part number.
pub const PART_NUMBER_FIELD: &str = "part_number";

/// Multipart field carrying the total number of parts.
pub const TOTAL_PARTS_FIELD: &str = "total_parts";

/// Query parameter used by the search endpoint.
pub const SEARCH_QUERY_PARAM: &str = "file_name";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Upload.path(), "/upload/");
        assert_eq!(Endpoint::Download.path(), "/download/");
        assert_eq!(Endpoint::Search.path(), "/search/");
        assert_eq!(Endpoint::Files.path(), "/files/");
    }
}
