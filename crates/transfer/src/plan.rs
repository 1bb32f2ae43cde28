use std::iter::FusedIterator;
use std::ops::Range;

/// One contiguous byte range of a file, transmitted as a single upload unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkDescriptor {
    /// Position in transmission order, starting at 0.
    pub index: usize,
    /// First byte of the chunk (inclusive).
    pub start: u64,
    /// One past the last byte of the chunk (exclusive).
    pub end: u64,
}

impl ChunkDescriptor {
    /// Number of bytes in the chunk. Never zero.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Always `false`; a plan never yields an empty chunk.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// The chunk as a byte range.
    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }

    /// 1-based part number as the storage service counts parts.
    pub fn part_number(&self) -> usize {
        self.index + 1
    }
}

/// Number of chunks needed to cover `size` bytes: `ceil(size / chunk_size)`.
///
/// # Panics
///
/// Panics if `chunk_size` is zero.
pub fn chunk_count(size: u64, chunk_size: u64) -> usize {
    assert!(chunk_size > 0, "chunk size must be positive");
    size.div_ceil(chunk_size) as usize
}

/// Plans the ordered chunks covering `[0, size)`.
///
/// The plan is lazy and a pure function of its inputs: cloning it or calling
/// `plan` again yields the same sequence. Every chunk but the last spans
/// exactly `chunk_size` bytes; the last one ends at `size`.
///
/// # Panics
///
/// Panics if `chunk_size` is zero. That is a caller bug, not a runtime
/// condition.
pub fn plan(size: u64, chunk_size: u64) -> ChunkPlan {
    assert!(chunk_size > 0, "chunk size must be positive");
    ChunkPlan {
        size,
        chunk_size,
        next_index: 0,
        next_offset: 0,
    }
}

/// Iterator over the chunks of a file. Created by [`plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    size: u64,
    chunk_size: u64,
    next_index: usize,
    next_offset: u64,
}

impl ChunkPlan {
    /// Total number of chunks in the plan, including those already yielded.
    pub fn total_chunks(&self) -> usize {
        chunk_count(self.size, self.chunk_size)
    }
}

impl Iterator for ChunkPlan {
    type Item = ChunkDescriptor;

    fn next(&mut self) -> Option<ChunkDescriptor> {
        if self.next_offset >= self.size {
            return None;
        }

        let start = self.next_offset;
        let end = start.saturating_add(self.chunk_size).min(self.size);
        let chunk = ChunkDescriptor {
            index: self.next_index,
            start,
            end,
        };

        self.next_offset = end;
        self.next_index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_chunks() - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkPlan {}

impl FusedIterator for ChunkPlan {}
