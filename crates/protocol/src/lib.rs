//! Binary framing for the chunkxfer file-transfer protocol.
//!
//! Pure encode/decode functions with no I/O. The async socket side lives in
//! `chunkxfer-data-channel`.
//!
//! # Wire format
//!
//! ```text
//! REQUEST HEADER:  [1 byte: command code][4 bytes BE: payload_len]
//! INTEGER:         [4 bytes BE: u32]
//! BOOLEAN:         [1 byte: 0x00=false, anything else=true]
//!
//! PING             header(PING, 0)                        -> bool
//! LIST             header(LIST, 0)                        -> u32 len, len bytes
//! REQUEST_UPLOAD   header(REQUEST_UPLOAD, n), name        -> bool (exists)
//!                  then u32 file_size
//! UPLOAD_CHUNK     header(UPLOAD_CHUNK, n), name, u32 start, u32 end, raw bytes
//! REQUEST_DOWNLOAD header(REQUEST_DOWNLOAD, n), name      -> bool + u32 size (5 bytes)
//! DOWNLOAD_CHUNK   header(DOWNLOAD_CHUNK, n), name, u32 start, u32 end -> raw bytes
//! DELETE           header(DELETE, n), name                -> bool (existed)
//! ```
//!
//! Offsets are inclusive on both ends, so a chunk carries `end - start + 1`
//! bytes. Every integer is a u32, which caps files at 4 GiB.

mod codec;
mod command;
mod error;

pub use codec::{
    BOOL_LEN, DOWNLOAD_REPLY_LEN, DownloadReply, HEADER_LEN, Header, U32_LEN, decode_bool,
    decode_header, decode_u32, encode_bool, encode_header, encode_u32, payload_len,
};
pub use command::Command;
pub use error::ProtocolError;
