//! Error types for the data channel.

use chunkxfer_protocol::ProtocolError;

/// Errors produced while talking to the server over one connection.
#[derive(Debug, thiserror::Error)]
pub enum DataChannelError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    #[error("connection timed out")]
    Timeout,

    #[error("cancelled")]
    Cancelled,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
