//! All-or-nothing socket primitives.
//!
//! A TCP stream may hand back any prefix of what the peer sent, so every
//! read here loops until the requested length is filled or the peer closes.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::DataChannelError;

/// Fills `buf` completely from `reader`.
///
/// Fails with [`DataChannelError::ConnectionClosed`] if the stream ends
/// first. The bytes read so far are left in `buf` but must not be used.
pub async fn recv_into<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), DataChannelError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(DataChannelError::ConnectionClosed {
                expected: buf.len(),
                received: filled,
            });
        }
        filled += n;
    }
    Ok(())
}

/// Reads exactly `n` bytes.
pub async fn recv_exact<R: AsyncRead + Unpin>(
    reader: &mut R,
    n: usize,
) -> Result<Vec<u8>, DataChannelError> {
    let mut buf = vec![0u8; n];
    recv_into(reader, &mut buf).await?;
    Ok(buf)
}

/// Writes every byte of `bytes` and flushes.
pub async fn send_all<W: AsyncWrite + Unpin>(
    writer: &mut W,
    bytes: &[u8],
) -> Result<(), DataChannelError> {
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Waits for the peer to close the connection, discarding anything it sends.
pub async fn await_close<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(), DataChannelError> {
    let mut scratch = [0u8; 64];
    while reader.read(&mut scratch).await? > 0 {}
    Ok(())
}

/// Bounds a socket operation by `duration`.
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> Result<T, DataChannelError>
where
    F: Future<Output = Result<T, DataChannelError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(DataChannelError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recv_exact_reads_full_buffer() {
        let data = b"0123456789";
        let mut cursor = &data[..];
        let got = recv_exact(&mut cursor, 4).await.unwrap();
        assert_eq!(got, b"0123");
        let rest = recv_exact(&mut cursor, 6).await.unwrap();
        assert_eq!(rest, b"456789");
    }

    #[tokio::test]
    async fn recv_exact_zero_length() {
        let mut cursor = &b""[..];
        assert!(recv_exact(&mut cursor, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recv_exact_short_stream_fails() {
        let mut cursor = &b"abc"[..];
        let err = recv_exact(&mut cursor, 5).await.unwrap_err();
        assert!(matches!(
            err,
            DataChannelError::ConnectionClosed {
                expected: 5,
                received: 3
            }
        ));
    }

    #[tokio::test]
    async fn recv_exact_assembles_partial_packets() {
        let (mut tx, mut rx) = tokio::io::duplex(4);

        let writer = tokio::spawn(async move {
            for piece in [&b"he"[..], b"llo ", b"wor", b"ld"] {
                tx.write_all(piece).await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        let got = recv_exact(&mut rx, 11).await.unwrap();
        assert_eq!(got, b"hello world");
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn recv_exact_peer_closes_mid_message() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(b"partial").await.unwrap();
        drop(tx);

        let err = recv_exact(&mut rx, 100).await.unwrap_err();
        assert!(matches!(
            err,
            DataChannelError::ConnectionClosed {
                expected: 100,
                received: 7
            }
        ));
    }

    #[tokio::test]
    async fn send_all_writes_everything() {
        let mut buf = Vec::new();
        send_all(&mut buf, b"payload").await.unwrap();
        assert_eq!(buf, b"payload");
    }

    #[tokio::test]
    async fn send_all_to_closed_peer_fails() {
        let (mut tx, rx) = tokio::io::duplex(8);
        drop(rx);
        let result = send_all(&mut tx, b"nobody is listening").await;
        assert!(matches!(result, Err(DataChannelError::Io(_))));
    }

    #[tokio::test]
    async fn await_close_returns_on_eof() {
        let (mut tx, mut rx) = tokio::io::duplex(8);
        tx.write_all(b"bye").await.unwrap();
        drop(tx);
        await_close(&mut rx).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn with_timeout_expires_on_silent_peer() {
        let (_tx, mut rx) = tokio::io::duplex(8);
        let result = with_timeout(Duration::from_secs(5), recv_exact(&mut rx, 1)).await;
        assert!(matches!(result, Err(DataChannelError::Timeout)));
    }
}
