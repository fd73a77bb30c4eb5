use std::time::Duration;

use chunkxfer_data_channel::connect::local_host_name;
use chunkxfer_data_channel::{Endpoint, TCP_CONNECT_TIMEOUT, TCP_IO_TIMEOUT};
use chunkxfer_transfer::DEFAULT_CHUNK_COUNT;
use serde::{Deserialize, Serialize};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server host name or address (this machine's host name by default).
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Chunks per upload or download.
    #[serde(default = "default_chunk_count")]
    pub chunk_count: usize,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Timeout for each send or receive, in seconds.
    #[serde(default = "default_io_timeout")]
    pub io_timeout_secs: u64,
}

fn default_host() -> String {
    local_host_name()
}

fn default_port() -> u16 {
    1306
}

fn default_chunk_count() -> usize {
    DEFAULT_CHUNK_COUNT
}

fn default_connect_timeout() -> u64 {
    TCP_CONNECT_TIMEOUT.as_secs()
}

fn default_io_timeout() -> u64 {
    TCP_IO_TIMEOUT.as_secs()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            chunk_count: default_chunk_count(),
            connect_timeout_secs: default_connect_timeout(),
            io_timeout_secs: default_io_timeout(),
        }
    }
}

impl ClientConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }
}
