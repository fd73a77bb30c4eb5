//! Connection setup.

use std::fmt;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::DataChannelError;

/// Server address. Fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Targets this machine by its host name.
    ///
    /// Falls back to `127.0.0.1` if the host name is not valid UTF-8.
    pub fn local(port: u16) -> Self {
        Self::new(local_host_name(), port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Returns this machine's host name.
pub fn local_host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "127.0.0.1".into())
}

/// Opens a fresh TCP connection to `endpoint`.
pub async fn connect(
    endpoint: &Endpoint,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<TcpStream, DataChannelError> {
    let stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(DataChannelError::Cancelled);
        }
        result = tokio::time::timeout(timeout, TcpStream::connect((endpoint.host(), endpoint.port()))) => {
            match result {
                Ok(Ok(s)) => s,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(DataChannelError::Timeout),
            }
        }
    };

    // Requests are small and latency-bound.
    stream.set_nodelay(true)?;
    debug!(%endpoint, "connected");
    Ok(stream)
}
