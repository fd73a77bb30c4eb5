//! Chunk planning, progress reporting and ranged file I/O.
//!
//! Everything here is transport-agnostic: the client crate pairs these
//! pieces with one TCP connection per chunk.

mod chunked;
mod plan;
mod progress;
mod validation;

pub use chunked::{ChunkSink, ChunkSource, preallocate};
pub use plan::{ByteRange, plan};
pub use progress::{
    NoopProgress, ProgressCallback, ProgressEvent, ProgressSink, ProgressTally, TransferKind,
};
pub use validation::validate_file_name;

/// Default number of chunks per transfer.
pub const DEFAULT_CHUNK_COUNT: usize = 4;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk count must be at least 1")]
    InvalidChunkCount,

    #[error("invalid file name: {0}")]
    InvalidPath(String),

    #[error("write of {len} bytes exceeds chunk range ({remaining} bytes left)")]
    RangeOverflow { len: usize, remaining: u64 },
}
