//! Socket side of the chunkxfer protocol.
//!
//! Provides the all-or-nothing primitives every exchange is built on
//! ([`io::recv_exact`], [`io::send_all`]), typed request/response helpers
//! on top of them, and connection setup with timeout and cancellation.
//!
//! # Wire format
//!
//! See `chunkxfer-protocol` for the frame layout.

pub mod connect;
pub mod error;
pub mod io;
pub mod wire;

pub use connect::{Endpoint, connect};
pub use error::DataChannelError;
pub use io::{await_close, recv_exact, recv_into, send_all, with_timeout};

use std::time::Duration;

/// Buffer size for streaming chunk bytes (256 KB).
pub const TCP_BUFFER_SIZE: usize = 256 * 1024;

/// Default timeout for the TCP connection attempt.
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a single send or receive.
pub const TCP_IO_TIMEOUT: Duration = Duration::from_secs(30);
