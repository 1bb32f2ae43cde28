use std::path::{Component, Path};

use crate::TransferError;

/// Validates a name the service stores a file under.
///
/// The name ends up both in a request path (`/download/{name}`) and in a
/// local path when downloading, so it must be a single plain component.
///
/// Rejects:
/// - Empty names
/// - `.` and `..`
/// - Path separators (`/`, `\`)
/// - Absolute paths and Windows prefixes (`C:`)
/// - Control characters
pub fn validate_file_name(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::InvalidFileName("empty name".into()));
    }

    if name.contains(['/', '\\']) {
        return Err(TransferError::InvalidFileName(format!(
            "path separators not allowed: {name}"
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(TransferError::InvalidFileName(format!(
            "control characters not allowed: {name:?}"
        )));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        (Some(Component::ParentDir), _) | (Some(Component::CurDir), _) => Err(
            TransferError::InvalidFileName(format!("relative reference not allowed: {name}")),
        ),
        _ => Err(TransferError::InvalidFileName(format!(
            "not a plain file name: {name}"
        ))),
    }
}
