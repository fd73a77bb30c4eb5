use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

use crate::TransferError;
use crate::plan::ByteRange;

/// Creates `path` with exactly `size` bytes, all zero.
///
/// Truncates an existing file. The extension may be sparse; what matters is
/// that the length is final before any chunk writes into it.
pub async fn preallocate(path: &Path, size: u64) -> Result<(), TransferError> {
    let file = File::create(path).await?;
    file.set_len(size).await?;
    file.sync_all().await?;
    debug!(path = %path.display(), size, "destination preallocated");
    Ok(())
}

// ---------------------------------------------------------------------------
// ChunkSource
// ---------------------------------------------------------------------------

/// Reads one byte range of a file through its own read-only handle.
pub struct ChunkSource {
    file: File,
    path: PathBuf,
    remaining: u64,
}

impl ChunkSource {
    /// Opens `path` and positions it at the start of `range`.
    pub async fn open(path: &Path, range: ByteRange) -> Result<Self, TransferError> {
        let mut file = File::open(path).await?;
        file.seek(SeekFrom::Start(range.start)).await?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            remaining: range.len,
        })
    }

    /// Fills as much of `buf` as the range allows.
    ///
    /// Returns the number of bytes read, 0 once the range is exhausted.
    /// Hitting end of file before the range is done is an error: the file
    /// changed size after the transfer was planned.
    pub async fn read_piece(&mut self, buf: &mut [u8]) -> Result<usize, TransferError> {
        let want = (buf.len() as u64).min(self.remaining) as usize;
        if want == 0 {
            return Ok(0);
        }
        self.file.read_exact(&mut buf[..want]).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                std::io::Error::new(
                    e.kind(),
                    format!("{} shrank during transfer", self.path.display()),
                )
            } else {
                e
            }
        })?;
        self.remaining -= want as u64;
        Ok(want)
    }

    /// Bytes of the range not read yet.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

// ---------------------------------------------------------------------------
// ChunkSink
// ---------------------------------------------------------------------------

const ZERO_FILL_PIECE: u64 = 64 * 1024;

/// Writes one byte range of a preallocated file through its own handle.
///
/// Each sink has an independent cursor, so sinks over disjoint ranges of the
/// same file can run concurrently without locking.
pub struct ChunkSink {
    file: File,
    range: ByteRange,
    remaining: u64,
}

impl ChunkSink {
    /// Opens the existing file at `path` for writing at the start of `range`.
    pub async fn open(path: &Path, range: ByteRange) -> Result<Self, TransferError> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(false)
            .open(path)
            .await?;
        file.seek(SeekFrom::Start(range.start)).await?;
        Ok(Self {
            file,
            range,
            remaining: range.len,
        })
    }

    /// Writes `data` at the current position inside the range.
    pub async fn write_piece(&mut self, data: &[u8]) -> Result<(), TransferError> {
        if data.len() as u64 > self.remaining {
            return Err(TransferError::RangeOverflow {
                len: data.len(),
                remaining: self.remaining,
            });
        }
        self.file.write_all(data).await?;
        self.remaining -= data.len() as u64;
        Ok(())
    }

    /// Flushes buffered writes to the file.
    pub async fn finish(mut self) -> Result<(), TransferError> {
        self.file.flush().await?;
        Ok(())
    }

    /// Overwrites everything written so far with zeros and rewinds to the
    /// start of the range, restoring the preallocated state.
    pub async fn zero_written(&mut self) -> Result<(), TransferError> {
        let mut written = self.range.len - self.remaining;
        self.file.seek(SeekFrom::Start(self.range.start)).await?;
        let zeros = vec![0u8; written.min(ZERO_FILL_PIECE) as usize];
        while written > 0 {
            let n = written.min(zeros.len() as u64) as usize;
            self.file.write_all(&zeros[..n]).await?;
            written -= n as u64;
        }
        self.file.flush().await?;
        self.file.seek(SeekFrom::Start(self.range.start)).await?;
        self.remaining = self.range.len;
        Ok(())
    }

    /// Bytes of the range not written yet.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}
