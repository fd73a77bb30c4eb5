fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;

    use chunkxfer_data_channel::wire::{
        recv_bool, recv_download_reply, recv_length_prefixed, send_chunk_request, send_command,
        send_u32,
    };
    use chunkxfer_protocol::{Command, DownloadReply, decode_header};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads the golden bytes recorded under `name` in `messages.json`.
    fn golden(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join("messages.json");
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        let messages: HashMap<String, String> = serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()));
        let encoded = messages
            .get(name)
            .unwrap_or_else(|| panic!("no fixture named {name}"));
        hex::decode(encoded).unwrap_or_else(|e| panic!("bad hex in fixture {name}: {e}"))
    }

    // --- requests ---

    #[tokio::test]
    async fn ping_request() {
        let mut buf = Vec::new();
        send_command(&mut buf, Command::Ping, &[]).await.unwrap();
        assert_eq!(buf, golden("ping_request"));
    }

    #[tokio::test]
    async fn list_request() {
        let mut buf = Vec::new();
        send_command(&mut buf, Command::List, &[]).await.unwrap();
        assert_eq!(buf, golden("list_request"));
    }

    #[tokio::test]
    async fn upload_negotiation() {
        let mut buf = Vec::new();
        send_command(&mut buf, Command::RequestUpload, b"notes.txt")
            .await
            .unwrap();
        assert_eq!(buf, golden("request_upload_notes"));

        let mut size = Vec::new();
        send_u32(&mut size, 10).await.unwrap();
        assert_eq!(size, golden("upload_size_10"));
    }

    #[tokio::test]
    async fn upload_chunk_request() {
        let mut buf = Vec::new();
        send_chunk_request(&mut buf, Command::UploadChunk, "notes.txt", 6, 9)
            .await
            .unwrap();
        assert_eq!(buf, golden("upload_chunk_notes_6_9"));
    }

    #[tokio::test]
    async fn download_requests() {
        let mut buf = Vec::new();
        send_command(&mut buf, Command::RequestDownload, b"a.bin")
            .await
            .unwrap();
        assert_eq!(buf, golden("request_download_a_bin"));

        let mut chunk = Vec::new();
        send_chunk_request(&mut chunk, Command::DownloadChunk, "a.bin", 0, 1)
            .await
            .unwrap();
        assert_eq!(chunk, golden("download_chunk_a_bin_0_1"));
    }

    #[tokio::test]
    async fn delete_request() {
        let mut buf = Vec::new();
        send_command(&mut buf, Command::Delete, b"old.log")
            .await
            .unwrap();
        assert_eq!(buf, golden("delete_old_log"));
    }

    /// The payload length in a chunk request covers the name only; the two
    /// offsets follow it outside the counted payload.
    #[test]
    fn chunk_request_length_excludes_offsets() {
        let bytes = golden("upload_chunk_notes_6_9");
        let header = decode_header(&bytes).unwrap();
        assert_eq!(header.command, Command::UploadChunk);
        assert_eq!(header.payload_len, 9);
        assert_eq!(bytes.len(), 5 + 9 + 4 + 4);
    }

    #[test]
    fn command_codes() {
        let codes: Vec<u8> = Command::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, [0, 1, 2, 3, 4, 5, 6]);
    }

    // --- replies ---

    #[tokio::test]
    async fn bool_replies() {
        assert!(recv_bool(&mut golden("bool_true").as_slice()).await.unwrap());
        assert!(!recv_bool(&mut golden("bool_false").as_slice()).await.unwrap());
        assert!(recv_bool(&mut golden("bool_nonzero").as_slice()).await.unwrap());
    }

    #[tokio::test]
    async fn download_replies() {
        let found = recv_download_reply(&mut golden("download_reply_found_1000").as_slice())
            .await
            .unwrap();
        assert_eq!(
            found,
            DownloadReply {
                exists: true,
                size: 1000
            }
        );

        let missing = recv_download_reply(&mut golden("download_reply_missing").as_slice())
            .await
            .unwrap();
        assert!(!missing.exists);
        assert_eq!(missing.encode().to_vec(), golden("download_reply_missing"));
    }

    #[tokio::test]
    async fn list_reply() {
        let payload = recv_length_prefixed(&mut golden("list_reply_two_files").as_slice())
            .await
            .unwrap();
        assert_eq!(payload, b"a.txt\nb.txt\n");
    }
}
