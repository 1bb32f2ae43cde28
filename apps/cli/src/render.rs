//! Text rendering for command results.

use std::fmt::Display;

use filedrop_upload::{UploadEvent, UploadOutcome, UploadReport};

/// Shown in place of an empty or failed listing.
pub const NO_FILES_PLACEHOLDER: &str = "No files found.";

/// Renders a listing or search result as one line per file.
///
/// Always yields at least one line: an empty result and a failed request
/// both render as the placeholder.
pub fn file_lines<E: Display>(result: &Result<Vec<String>, E>) -> Vec<String> {
    match result {
        Ok(files) if !files.is_empty() => files.clone(),
        _ => vec![NO_FILES_PLACEHOLDER.to_string()],
    }
}

/// One-line progress update for an upload event, if the event warrants one.
pub fn progress_line(event: &UploadEvent) -> Option<String> {
    match event {
        UploadEvent::Started {
            target,
            total_chunks,
            total_bytes,
            ..
        } => Some(format!(
            "uploading {target}: {} in {total_chunks} chunk(s)",
            human_bytes(*total_bytes)
        )),
        UploadEvent::Progress {
            chunk,
            total_chunks,
            transferred_bytes,
            total_bytes,
            bytes_per_second,
            eta,
            ..
        } => {
            let mut line = format!(
                "chunk {}/{total_chunks}  {} / {}",
                chunk + 1,
                human_bytes(*transferred_bytes),
                human_bytes(*total_bytes)
            );
            if *bytes_per_second > 0.0 {
                line.push_str(&format!("  {}/s", human_bytes(*bytes_per_second as u64)));
            }
            if let Some(eta) = eta {
                line.push_str(&format!("  eta {}s", eta.as_secs()));
            }
            Some(line)
        }
        UploadEvent::ChunkSkipped { chunk, error, .. } => {
            Some(format!("chunk {} skipped: {error}", chunk + 1))
        }
        UploadEvent::Completed { .. } | UploadEvent::Failed { .. } | UploadEvent::Cancelled { .. } => {
            None
        }
    }
}

/// Final summary of an upload.
pub fn upload_summary(report: &UploadReport) -> String {
    let progress = &report.progress;
    match &report.outcome {
        UploadOutcome::Completed if progress.failed_chunks.is_empty() => format!(
            "uploaded {} ({}, {} chunk(s))",
            progress.target,
            human_bytes(progress.total_bytes),
            progress.total_chunks
        ),
        UploadOutcome::Completed => format!(
            "uploaded {} with gaps: {} of {} chunk(s) failed (indices {:?})",
            progress.target,
            progress.failed_chunks.len(),
            progress.total_chunks,
            progress.failed_chunks
        ),
        UploadOutcome::FailedAtChunk { index, reason } => format!(
            "upload of {} failed at chunk {index} after {} of {} chunk(s): {reason}",
            progress.target, progress.completed_chunks, progress.total_chunks
        ),
        UploadOutcome::Cancelled => format!(
            "upload of {} cancelled after {} of {} chunk(s)",
            progress.target, progress.completed_chunks, progress.total_chunks
        ),
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
