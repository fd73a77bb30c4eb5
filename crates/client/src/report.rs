use chunkxfer_transfer::{ByteRange, TransferKind};

use crate::error::ClientError;

/// Result of one chunk.
#[derive(Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    pub range: ByteRange,
    pub result: Result<(), ClientError>,
}

impl ChunkOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-chunk results of an upload or download, in chunk order.
///
/// Chunk failures do not fail the operation: every chunk runs to
/// completion and its outcome lands here. A report with failed chunks means
/// the remote (upload) or local (download) file is wrong in those ranges.
/// Use [`into_result`](Self::into_result) to treat that as an error.
#[derive(Debug)]
pub struct TransferReport {
    pub kind: TransferKind,
    pub name: String,
    pub total_size: u64,
    pub chunks: Vec<ChunkOutcome>,
}

impl TransferReport {
    /// True when every chunk succeeded.
    pub fn is_complete(&self) -> bool {
        self.chunks.iter().all(ChunkOutcome::is_ok)
    }

    /// Indices of the chunks that failed.
    pub fn failed_chunks(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .filter(|c| !c.is_ok())
            .map(|c| c.index)
            .collect()
    }

    /// Bytes covered by successful chunks.
    pub fn bytes_transferred(&self) -> u64 {
        self.chunks
            .iter()
            .filter(|c| c.is_ok())
            .map(|c| c.range.len)
            .sum()
    }

    /// Turns a report with failed chunks into
    /// [`ClientError::IncompleteTransfer`].
    pub fn into_result(self) -> Result<Self, ClientError> {
        let failed = self.failed_chunks();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(ClientError::IncompleteTransfer {
                failed,
                total: self.chunks.len(),
            })
        }
    }
}
