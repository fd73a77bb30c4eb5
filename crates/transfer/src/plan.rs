use std::fmt;

use crate::TransferError;

/// A contiguous byte range of a file, inclusive on both ends.
///
/// Stored as `start` + `len` so an empty range never needs an end offset
/// below its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: u64,
    pub len: u64,
}

impl ByteRange {
    /// Builds the range `[start, end]`.
    ///
    /// `None` when `end < start` or the length does not fit in a `u64`.
    pub fn inclusive(start: u64, end: u64) -> Option<Self> {
        let len = end.checked_sub(start)?.checked_add(1)?;
        Some(Self { start, len })
    }

    /// Inclusive end offset, or `None` for an empty range.
    pub fn end(&self) -> Option<u64> {
        (self.len > 0).then(|| self.start + self.len - 1)
    }

    /// One past the last byte.
    pub fn end_exclusive(&self) -> u64 {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "[{}, {}]", self.start, end),
            None => write!(f, "[{}, empty]", self.start),
        }
    }
}

/// Splits `total_size` bytes into `chunk_count` ordered, disjoint ranges.
///
/// Every chunk gets `total_size / chunk_count` bytes and the last one also
/// takes the remainder. When there are more chunks than bytes the leading
/// chunks are empty. An empty file yields no chunks at all.
pub fn plan(total_size: u64, chunk_count: usize) -> Result<Vec<ByteRange>, TransferError> {
    if chunk_count == 0 {
        return Err(TransferError::InvalidChunkCount);
    }
    if total_size == 0 {
        return Ok(Vec::new());
    }

    let count = chunk_count as u64;
    let base = total_size / count;
    let last_start = (count - 1) * base;

    let mut ranges: Vec<ByteRange> = (0..count - 1)
        .map(|i| ByteRange {
            start: i * base,
            len: base,
        })
        .collect();
    ranges.push(ByteRange {
        start: last_start,
        len: total_size - last_start,
    });
    Ok(ranges)
}
