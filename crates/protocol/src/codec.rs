use crate::{Command, ProtocolError};

/// Request header length: 1 byte command + 4 bytes payload length.
pub const HEADER_LEN: usize = 5;

/// Length of an encoded integer.
pub const U32_LEN: usize = 4;

/// Length of an encoded boolean.
pub const BOOL_LEN: usize = 1;

/// Length of the combined REQUEST_DOWNLOAD response.
pub const DOWNLOAD_REPLY_LEN: usize = BOOL_LEN + U32_LEN;

/// A decoded request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub command: Command,
    pub payload_len: u32,
}

/// Encodes a request header.
pub fn encode_header(command: Command, payload_len: u32) -> [u8; HEADER_LEN] {
    let len = payload_len.to_be_bytes();
    [command.code(), len[0], len[1], len[2], len[3]]
}

/// Decodes a request header from the start of `data`.
pub fn decode_header(data: &[u8]) -> Result<Header, ProtocolError> {
    let bytes = take::<HEADER_LEN>(data, "header")?;
    let command = Command::try_from(bytes[0])?;
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
    Ok(Header {
        command,
        payload_len,
    })
}

pub fn encode_u32(value: u32) -> [u8; U32_LEN] {
    value.to_be_bytes()
}

pub fn decode_u32(data: &[u8]) -> Result<u32, ProtocolError> {
    take::<U32_LEN>(data, "integer").map(u32::from_be_bytes)
}

pub fn encode_bool(value: bool) -> [u8; BOOL_LEN] {
    [value as u8]
}

/// Decodes a boolean. Any non-zero byte is `true`.
pub fn decode_bool(data: &[u8]) -> Result<bool, ProtocolError> {
    take::<BOOL_LEN>(data, "boolean").map(|b| b[0] != 0)
}

/// Converts a payload length to its wire representation.
pub fn payload_len(len: usize) -> Result<u32, ProtocolError> {
    u32::try_from(len).map_err(|_| ProtocolError::PayloadTooLarge(len))
}

/// Server response to REQUEST_DOWNLOAD, sent as one 5-byte message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReply {
    pub exists: bool,
    pub size: u32,
}

impl DownloadReply {
    pub fn encode(&self) -> [u8; DOWNLOAD_REPLY_LEN] {
        let size = self.size.to_be_bytes();
        [self.exists as u8, size[0], size[1], size[2], size[3]]
    }

    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let bytes = take::<DOWNLOAD_REPLY_LEN>(data, "download reply")?;
        Ok(Self {
            exists: decode_bool(&bytes[..BOOL_LEN])?,
            size: decode_u32(&bytes[BOOL_LEN..])?,
        })
    }
}

fn take<const N: usize>(data: &[u8], what: &'static str) -> Result<[u8; N], ProtocolError> {
    data.get(..N)
        .and_then(|s| <[u8; N]>::try_from(s).ok())
        .ok_or(ProtocolError::Truncated {
            what,
            expected: N,
            got: data.len(),
        })
}
