use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use crate::TransferError;
use crate::plan::ChunkDescriptor;
use crate::validation::validate_file_name;

/// Read-only, fixed-length byte source that an upload slices into chunks.
///
/// Implementations must return the same bytes for the same range for the
/// whole duration of an upload.
pub trait ByteSource: Send + Sync {
    /// Name the file is stored under on the service.
    fn name(&self) -> &str;

    /// Total length in bytes.
    fn size(&self) -> u64;

    /// Reads exactly the bytes covered by `chunk`.
    fn read_chunk(&self, chunk: &ChunkDescriptor) -> Result<Vec<u8>, TransferError>;
}

fn check_bounds(chunk: &ChunkDescriptor, size: u64) -> Result<(), TransferError> {
    if chunk.end > size || chunk.start > chunk.end {
        return Err(TransferError::OutOfRange {
            index: chunk.index,
            end: chunk.end,
            size,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// A file on local disk. The size is captured when the file is opened.
pub struct FileSource {
    file: Mutex<File>,
    name: String,
    size: u64,
}

impl FileSource {
    /// Opens `path`, naming the upload after the file's last path component.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::open_as(path, &name)
    }

    /// Opens `path`, storing it on the service as `name`.
    pub fn open_as(path: &Path, name: &str) -> Result<Self, TransferError> {
        validate_file_name(name)?;
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            name: name.to_string(),
            size,
        })
    }
}

impl ByteSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_chunk(&self, chunk: &ChunkDescriptor) -> Result<Vec<u8>, TransferError> {
        check_bounds(chunk, self.size)?;

        // Every read seeks first, so a poisoned handle is still usable.
        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        file.seek(SeekFrom::Start(chunk.start))?;

        let expected = chunk.len();
        let mut buf = Vec::with_capacity(expected as usize);
        let actual = (&mut *file).take(expected).read_to_end(&mut buf)? as u64;
        if actual != expected {
            return Err(TransferError::ShortRead {
                offset: chunk.start,
                expected,
                actual,
            });
        }
        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// An in-memory buffer, e.g. bytes handed over by a form submission.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    data: Vec<u8>,
}

impl MemorySource {
    /// Wraps `data` under the given target name.
    pub fn new(name: &str, data: Vec<u8>) -> Result<Self, TransferError> {
        validate_file_name(name)?;
        Ok(Self {
            name: name.to_string(),
            data,
        })
    }
}

impl ByteSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_chunk(&self, chunk: &ChunkDescriptor) -> Result<Vec<u8>, TransferError> {
        check_bounds(chunk, self.size())?;
        Ok(self.data[chunk.start as usize..chunk.end as usize].to_vec())
    }
}
