use std::path::PathBuf;

use chunkxfer_data_channel::DataChannelError;
use chunkxfer_transfer::TransferError;

/// Broad failure category, used to decide how far an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Detected during negotiation, before any chunk work.
    Precondition,
    /// Connect, send, receive or close failure on one connection.
    Transport,
    /// Local file read or write failure.
    Io,
    /// Some chunks of an otherwise finished transfer failed.
    Incomplete,
    /// A chunk task died without producing a result.
    Internal,
}

/// Errors returned by [`FileTransferClient`](crate::FileTransferClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("file already exists on the server: {0}")]
    RemoteFileExists(String),

    #[error("file not found on the server: {0}")]
    RemoteFileNotFound(String),

    #[error("destination directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("chunk count must be at least 1")]
    InvalidChunkCount,

    #[error("file too large for the protocol: {size} bytes (max {max})", max = u32::MAX)]
    FileTooLarge { size: u64 },

    #[error(transparent)]
    Transport(#[from] DataChannelError),

    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk task failed: {0}")]
    Worker(String),

    #[error("{} of {total} chunks failed: {failed:?}", .failed.len())]
    IncompleteTransfer { failed: Vec<usize>, total: usize },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::RemoteFileExists(_)
            | ClientError::RemoteFileNotFound(_)
            | ClientError::DirectoryNotFound(_)
            | ClientError::InvalidFileName(_)
            | ClientError::InvalidChunkCount
            | ClientError::FileTooLarge { .. } => ErrorKind::Precondition,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Io(_) => ErrorKind::Io,
            ClientError::IncompleteTransfer { .. } => ErrorKind::Incomplete,
            ClientError::Worker(_) => ErrorKind::Internal,
        }
    }
}

impl From<TransferError> for ClientError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Io(e) => ClientError::Io(e),
            TransferError::InvalidChunkCount => ClientError::InvalidChunkCount,
            TransferError::InvalidPath(reason) => ClientError::InvalidFileName(reason),
            overflow @ TransferError::RangeOverflow { .. } => ClientError::Io(
                std::io::Error::new(std::io::ErrorKind::InvalidData, overflow.to_string()),
            ),
        }
    }
}
