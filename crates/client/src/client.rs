//! File-level operations.
//!
//! ```text
//! NEGOTIATE -> (abort | PLAN) -> DISPATCH_CHUNKS -> AWAIT_ALL -> DONE
//! ```
//!
//! Negotiation happens on a control connection, strictly request then
//! response, before any chunk connection is opened. The control connection
//! stays open until every chunk task has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chunkxfer_data_channel::wire::{
    recv_bool, recv_download_reply, recv_length_prefixed, send_command, send_u32,
};
use chunkxfer_data_channel::{DataChannelError, Endpoint, TCP_CONNECT_TIMEOUT, TCP_IO_TIMEOUT};
use chunkxfer_protocol::{Command, ProtocolError};
use chunkxfer_transfer::{
    ByteRange, NoopProgress, ProgressSink, TransferKind, plan, preallocate, validate_file_name,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::connector::Connector;
use crate::error::ClientError;
use crate::report::{ChunkOutcome, TransferReport};
use crate::worker::{self, ChunkTask};

/// Client for one server endpoint.
///
/// Every call opens fresh connections; nothing is shared between calls
/// except configuration, the progress sink and the cancellation token.
pub struct FileTransferClient {
    connector: Connector,
    progress: Arc<dyn ProgressSink>,
}

impl FileTransferClient {
    /// Creates a client with default timeouts and no progress sink.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            connector: Connector {
                endpoint,
                connect_timeout: TCP_CONNECT_TIMEOUT,
                io_timeout: TCP_IO_TIMEOUT,
                cancel: CancellationToken::new(),
            },
            progress: Arc::new(NoopProgress),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.endpoint()).with_timeouts(config.connect_timeout(), config.io_timeout())
    }

    /// Sets the sink that receives one event per completed chunk.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Arc::new(sink);
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connector.connect_timeout = connect;
        self.connector.io_timeout = io;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.connector.endpoint
    }

    /// Token that aborts every pending and future operation of this client.
    ///
    /// Chunk tasks stop at their next socket operation and close their
    /// connections. Completed chunks keep their bytes; an interrupted
    /// download chunk clears its range back to zeros.
    pub fn cancel_token(&self) -> CancellationToken {
        self.connector.cancel.clone()
    }

    pub fn cancel(&self) {
        self.connector.cancel.cancel();
    }

    // -----------------------------------------------------------------------
    // Simple request/response operations
    // -----------------------------------------------------------------------

    /// Best-effort liveness probe. Any failure counts as "not alive".
    pub async fn ping(&self) -> bool {
        match self.try_ping().await {
            Ok(alive) => alive,
            Err(e) => {
                warn!(endpoint = %self.endpoint(), error = %e, "ping failed");
                false
            }
        }
    }

    async fn try_ping(&self) -> Result<bool, ClientError> {
        let conn = &self.connector;
        let mut stream = conn.open().await?;
        conn.io(send_command(&mut stream, Command::Ping, &[])).await?;
        Ok(conn.io(recv_bool(&mut stream)).await?)
    }

    /// Returns the server's file listing as text. The format is up to the
    /// server.
    pub async fn list_files(&self) -> Result<String, ClientError> {
        let conn = &self.connector;
        let mut stream = conn.open().await?;
        conn.io(send_command(&mut stream, Command::List, &[])).await?;
        let payload = conn.io(recv_length_prefixed(&mut stream)).await?;
        String::from_utf8(payload)
            .map_err(|_| DataChannelError::from(ProtocolError::InvalidUtf8("file listing")).into())
    }

    /// Listing split into one name per non-empty line.
    pub async fn list_file_names(&self) -> Result<Vec<String>, ClientError> {
        let listing = self.list_files().await?;
        Ok(listing
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Deletes `name` on the server.
    pub async fn delete_file(&self, name: &str) -> Result<(), ClientError> {
        let conn = &self.connector;
        let mut stream = conn.open().await?;
        conn.io(send_command(&mut stream, Command::Delete, name.as_bytes()))
            .await?;
        if !conn.io(recv_bool(&mut stream)).await? {
            return Err(ClientError::RemoteFileNotFound(name.to_owned()));
        }
        info!(file = name, "deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Chunked transfers
    // -----------------------------------------------------------------------

    /// Uploads `path` under its base name, split into `chunk_count` chunks.
    ///
    /// Fails before any chunk connection if the server already has a file
    /// with that name. Otherwise returns once every chunk has finished; chunk
    /// failures are recorded in the report, not returned as an error.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        chunk_count: usize,
    ) -> Result<TransferReport, ClientError> {
        let path = path.as_ref();
        if chunk_count == 0 {
            return Err(ClientError::InvalidChunkCount);
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::InvalidFileName(path.display().to_string()))?
            .to_owned();

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }
        let size = metadata.len();
        let wire_size = u32::try_from(size).map_err(|_| ClientError::FileTooLarge { size })?;
        let ranges = plan(size, chunk_count)?;

        // Negotiate.
        let conn = &self.connector;
        let mut control = conn.open().await?;
        conn.io(send_command(
            &mut control,
            Command::RequestUpload,
            file_name.as_bytes(),
        ))
        .await?;
        if conn.io(recv_bool(&mut control)).await? {
            return Err(ClientError::RemoteFileExists(file_name));
        }
        conn.io(send_u32(&mut control, wire_size)).await?;

        info!(
            file = %file_name,
            size,
            chunks = ranges.len(),
            "upload started"
        );

        let report = self
            .dispatch(TransferKind::Upload, file_name, path.to_path_buf(), size, ranges)
            .await;
        drop(control);

        log_finished(&report);
        Ok(report)
    }

    /// Downloads `name` into `destination_dir`, split into `chunk_count`
    /// chunks.
    ///
    /// `destination_dir` must already exist. The destination file is
    /// created at its final size before any chunk writes into it, so a
    /// failed chunk leaves zeros in its range.
    pub async fn download_file(
        &self,
        name: &str,
        destination_dir: impl AsRef<Path>,
        chunk_count: usize,
    ) -> Result<TransferReport, ClientError> {
        let destination_dir = destination_dir.as_ref();
        if chunk_count == 0 {
            return Err(ClientError::InvalidChunkCount);
        }
        validate_file_name(name)?;

        match tokio::fs::metadata(destination_dir).await {
            Ok(m) if m.is_dir() => {}
            _ => return Err(ClientError::DirectoryNotFound(destination_dir.to_path_buf())),
        }

        // Negotiate.
        let conn = &self.connector;
        let mut control = conn.open().await?;
        conn.io(send_command(
            &mut control,
            Command::RequestDownload,
            name.as_bytes(),
        ))
        .await?;
        let reply = conn.io(recv_download_reply(&mut control)).await?;
        if !reply.exists {
            return Err(ClientError::RemoteFileNotFound(name.to_owned()));
        }

        let size = u64::from(reply.size);
        let ranges = plan(size, chunk_count)?;
        let destination = destination_dir.join(name);
        preallocate(&destination, size).await?;

        info!(
            file = name,
            size,
            chunks = ranges.len(),
            destination = %destination.display(),
            "download started"
        );

        let report = self
            .dispatch(TransferKind::Download, name.to_owned(), destination, size, ranges)
            .await;
        drop(control);

        log_finished(&report);
        Ok(report)
    }

    /// Spawns one task per range and waits for all of them.
    async fn dispatch(
        &self,
        kind: TransferKind,
        file_name: String,
        local_path: PathBuf,
        total_size: u64,
        ranges: Vec<ByteRange>,
    ) -> TransferReport {
        // Dropping this call (or finishing it) cancels any task still running.
        let connector = self.connector.child();
        let _abort_on_drop = connector.cancel.clone().drop_guard();

        let file_name: Arc<str> = file_name.into();
        let local_path: Arc<Path> = local_path.into();

        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(index, &range)| {
                let task = ChunkTask {
                    kind,
                    index,
                    range,
                    file_name: Arc::clone(&file_name),
                    local_path: Arc::clone(&local_path),
                    connector: connector.clone(),
                    progress: Arc::clone(&self.progress),
                };
                (index, range, tokio::spawn(worker::run(task)))
            })
            .collect();

        let mut chunks = Vec::with_capacity(handles.len());
        for (index, range, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(chunk = index, error = %e, "chunk task died");
                    ChunkOutcome {
                        index,
                        range,
                        result: Err(ClientError::Worker(e.to_string())),
                    }
                }
            };
            chunks.push(outcome);
        }

        TransferReport {
            kind,
            name: file_name.to_string(),
            total_size,
            chunks,
        }
    }
}

fn log_finished(report: &TransferReport) {
    let failed = report.failed_chunks();
    if failed.is_empty() {
        info!(
            kind = %report.kind,
            file = %report.name,
            bytes = report.bytes_transferred(),
            "transfer complete"
        );
    } else {
        warn!(
            kind = %report.kind,
            file = %report.name,
            failed = ?failed,
            total = report.chunks.len(),
            "transfer finished with failed chunks"
        );
    }
}
