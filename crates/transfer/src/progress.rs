use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::mpsc;

/// Direction of a chunked transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    Upload,
    Download,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransferKind::Upload => "upload",
            TransferKind::Download => "download",
        })
    }
}

/// Emitted once for every chunk that completed successfully.
///
/// Events for one transfer may arrive in any chunk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub kind: TransferKind,
    pub chunk: usize,
    pub bytes: u64,
}

/// Receiver of progress events. Must not block.
pub trait ProgressSink: Send + Sync {
    fn chunk_completed(&self, event: ProgressEvent);
}

/// Callback invoked with each progress event.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

impl ProgressSink for ProgressCallback {
    fn chunk_completed(&self, event: ProgressEvent) {
        self(event)
    }
}

impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn chunk_completed(&self, event: ProgressEvent) {
        // A dropped receiver just means nobody is watching.
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn chunk_completed(&self, _event: ProgressEvent) {}
}

/// Running totals of completed chunks and bytes.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ProgressTally {
    inner: Arc<TallyInner>,
}

#[derive(Debug, Default)]
struct TallyInner {
    chunks: AtomicUsize,
    bytes: AtomicU64,
}

impl ProgressTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> usize {
        self.inner.chunks.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> u64 {
        self.inner.bytes.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ProgressTally {
    fn chunk_completed(&self, event: ProgressEvent) {
        self.inner.chunks.fetch_add(1, Ordering::Relaxed);
        self.inner.bytes.fetch_add(event.bytes, Ordering::Relaxed);
    }
}
