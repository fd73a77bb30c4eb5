//! Chunked, concurrent file-transfer client.
//!
//! Every operation opens its own control connection to negotiate with the
//! server. Uploads and downloads then split the file into byte ranges and
//! move each range over a dedicated connection, all in parallel.

mod client;
mod config;
mod connector;
mod error;
mod report;
mod worker;

#[cfg(test)]
mod test_server;

pub use chunkxfer_data_channel::Endpoint;
pub use chunkxfer_transfer::{
    ByteRange, NoopProgress, ProgressCallback, ProgressEvent, ProgressSink, ProgressTally,
    TransferKind,
};
pub use client::FileTransferClient;
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind};
pub use report::{ChunkOutcome, TransferReport};
