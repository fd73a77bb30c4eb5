//! Typed request/response helpers.
//!
//! Each `send_*` builds the whole message first and hands it to
//! [`send_all`] in one piece, so a request is never left half-written
//! by an early return between its fields.

use chunkxfer_protocol::{
    BOOL_LEN, Command, DOWNLOAD_REPLY_LEN, DownloadReply, HEADER_LEN, U32_LEN, decode_bool,
    decode_u32, encode_header, encode_u32, payload_len,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::TCP_BUFFER_SIZE;
use crate::error::DataChannelError;
use crate::io::{recv_into, send_all};

/// Sends a request header followed by `payload`.
pub async fn send_command<W: AsyncWrite + Unpin>(
    writer: &mut W,
    command: Command,
    payload: &[u8],
) -> Result<(), DataChannelError> {
    let len = payload_len(payload.len())?;
    let mut msg = Vec::with_capacity(HEADER_LEN + payload.len());
    msg.extend_from_slice(&encode_header(command, len));
    msg.extend_from_slice(payload);
    send_all(writer, &msg).await
}

/// Sends a chunk request: header, file name, start and end offsets.
pub async fn send_chunk_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    command: Command,
    file_name: &str,
    start: u32,
    end: u32,
) -> Result<(), DataChannelError> {
    let name = file_name.as_bytes();
    let len = payload_len(name.len())?;
    let mut msg = Vec::with_capacity(HEADER_LEN + name.len() + 2 * U32_LEN);
    msg.extend_from_slice(&encode_header(command, len));
    msg.extend_from_slice(name);
    msg.extend_from_slice(&encode_u32(start));
    msg.extend_from_slice(&encode_u32(end));
    send_all(writer, &msg).await
}

pub async fn send_u32<W: AsyncWrite + Unpin>(
    writer: &mut W,
    value: u32,
) -> Result<(), DataChannelError> {
    send_all(writer, &encode_u32(value)).await
}

pub async fn recv_bool<R: AsyncRead + Unpin>(reader: &mut R) -> Result<bool, DataChannelError> {
    let mut buf = [0u8; BOOL_LEN];
    recv_into(reader, &mut buf).await?;
    Ok(decode_bool(&buf)?)
}

pub async fn recv_u32<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u32, DataChannelError> {
    let mut buf = [0u8; U32_LEN];
    recv_into(reader, &mut buf).await?;
    Ok(decode_u32(&buf)?)
}

/// Reads a 4-byte length followed by that many bytes.
///
/// The buffer grows with the bytes actually received, so a peer announcing
/// a huge length cannot make us allocate it up front.
pub async fn recv_length_prefixed<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, DataChannelError> {
    let len = recv_u32(reader).await? as usize;
    let mut payload = Vec::with_capacity(len.min(TCP_BUFFER_SIZE));
    reader.take(len as u64).read_to_end(&mut payload).await?;
    if payload.len() < len {
        return Err(DataChannelError::ConnectionClosed {
            expected: len,
            received: payload.len(),
        });
    }
    Ok(payload)
}

/// Reads the combined exists/size response to REQUEST_DOWNLOAD.
pub async fn recv_download_reply<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<DownloadReply, DataChannelError> {
    let mut buf = [0u8; DOWNLOAD_REPLY_LEN];
    recv_into(reader, &mut buf).await?;
    Ok(DownloadReply::decode(&buf)?)
}
