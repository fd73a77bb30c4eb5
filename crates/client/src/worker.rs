//! One chunk over one fresh connection.

use std::path::Path;
use std::sync::Arc;

use chunkxfer_data_channel::wire::send_chunk_request;
use chunkxfer_data_channel::{TCP_BUFFER_SIZE, await_close, recv_into, send_all};
use chunkxfer_protocol::Command;
use chunkxfer_transfer::{
    ByteRange, ChunkSink, ChunkSource, ProgressEvent, ProgressSink, TransferKind,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::connector::Connector;
use crate::error::ClientError;
use crate::report::ChunkOutcome;

/// Everything one chunk task needs. Moved into the task that runs it.
pub(crate) struct ChunkTask {
    pub kind: TransferKind,
    pub index: usize,
    pub range: ByteRange,
    /// Name the server knows the file by.
    pub file_name: Arc<str>,
    /// Upload source or preallocated download destination.
    pub local_path: Arc<Path>,
    pub connector: Connector,
    pub progress: Arc<dyn ProgressSink>,
}

/// Runs a chunk to completion. Never fails: the outcome carries the error.
pub(crate) async fn run(task: ChunkTask) -> ChunkOutcome {
    let result = if task.range.is_empty() {
        Ok(())
    } else {
        match task.kind {
            TransferKind::Upload => upload_chunk(&task).await,
            TransferKind::Download => download_chunk(&task).await,
        }
    };

    match &result {
        Ok(()) => {
            debug!(
                kind = %task.kind,
                chunk = task.index,
                range = %task.range,
                "chunk done"
            );
            task.progress.chunk_completed(ProgressEvent {
                kind: task.kind,
                chunk: task.index,
                bytes: task.range.len,
            });
        }
        Err(e) => {
            warn!(
                kind = %task.kind,
                file = %task.file_name,
                chunk = task.index,
                range = %task.range,
                error = %e,
                "chunk failed"
            );
        }
    }

    ChunkOutcome {
        index: task.index,
        range: task.range,
        result,
    }
}

/// Wire offsets of a non-empty range.
fn wire_bounds(range: ByteRange) -> Result<(u32, u32), ClientError> {
    let end = range.end().unwrap_or(range.start);
    let too_large = |_| ClientError::FileTooLarge {
        size: range.end_exclusive(),
    };
    Ok((
        u32::try_from(range.start).map_err(too_large)?,
        u32::try_from(end).map_err(too_large)?,
    ))
}

async fn upload_chunk(task: &ChunkTask) -> Result<(), ClientError> {
    let (start, end) = wire_bounds(task.range)?;
    let mut source = ChunkSource::open(&task.local_path, task.range).await?;

    let conn = &task.connector;
    let mut stream = conn.open().await?;
    conn.io(send_chunk_request(
        &mut stream,
        Command::UploadChunk,
        &task.file_name,
        start,
        end,
    ))
    .await?;

    let mut buf = vec![0u8; piece_len(task.range)];
    loop {
        let n = source.read_piece(&mut buf).await?;
        if n == 0 {
            break;
        }
        conn.io(send_all(&mut stream, &buf[..n])).await?;
    }

    // No acknowledgment in the protocol: the chunk is done once the server
    // has seen our end of stream and closed its side.
    conn.io(async {
        stream.shutdown().await?;
        await_close(&mut stream).await
    })
    .await?;
    Ok(())
}

async fn download_chunk(task: &ChunkTask) -> Result<(), ClientError> {
    let (start, end) = wire_bounds(task.range)?;
    let mut sink = ChunkSink::open(&task.local_path, task.range).await?;

    let conn = &task.connector;
    let mut stream = conn.open().await?;
    conn.io(send_chunk_request(
        &mut stream,
        Command::DownloadChunk,
        &task.file_name,
        start,
        end,
    ))
    .await?;

    let mut buf = vec![0u8; piece_len(task.range)];
    let received: Result<(), ClientError> = async {
        while sink.remaining() > 0 {
            let n = sink.remaining().min(buf.len() as u64) as usize;
            conn.io(recv_into(&mut stream, &mut buf[..n])).await?;
            sink.write_piece(&buf[..n]).await?;
        }
        Ok(())
    }
    .await;

    // A chunk that did not arrive whole leaves its range as preallocated.
    if let Err(e) = received {
        if let Err(wipe) = sink.zero_written().await {
            warn!(
                chunk = task.index,
                range = %task.range,
                error = %wipe,
                "could not clear partially written range"
            );
        }
        return Err(e);
    }

    sink.finish().await?;
    Ok(())
}

fn piece_len(range: ByteRange) -> usize {
    range.len.min(TCP_BUFFER_SIZE as u64) as usize
}
