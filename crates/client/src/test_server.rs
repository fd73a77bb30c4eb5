//! In-process server for client tests.
//!
//! Keeps files in memory and counts connections per command so tests can
//! assert that a failed precondition never reached the chunk stage.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chunkxfer_data_channel::wire::{recv_u32, send_u32};
use chunkxfer_data_channel::{DataChannelError, Endpoint, await_close, recv_exact, send_all};
use chunkxfer_protocol::{Command, DownloadReply, HEADER_LEN, decode_header, encode_bool};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Default)]
struct State {
    files: BTreeMap<String, Vec<u8>>,
    announced: HashMap<String, u32>,
    connections: HashMap<Command, usize>,
    /// DOWNLOAD_CHUNK requests starting here get half their bytes, then EOF.
    broken_starts: HashSet<u32>,
    /// UPLOAD_CHUNK requests starting here are dropped after half the data.
    broken_upload_starts: HashSet<u32>,
    /// Every DOWNLOAD_CHUNK gets a few bytes, then nothing until the client
    /// hangs up.
    stall_downloads: bool,
}

pub(crate) struct TestServer {
    endpoint: Endpoint,
    state: Arc<Mutex<State>>,
    accept_task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));

        let accept_state = Arc::clone(&state);
        let accept_task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let _ = handle(stream, state).await;
                });
            }
        });

        Self {
            endpoint: Endpoint::new("127.0.0.1", port),
            state,
            accept_task,
        }
    }

    /// An address with nothing listening on it.
    pub async fn unused_endpoint() -> Endpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Endpoint::new("127.0.0.1", port)
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint.clone()
    }

    pub fn put_file(&self, name: &str, data: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(name.to_owned(), data.to_vec());
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(name).cloned()
    }

    /// Size sent by the client after REQUEST_UPLOAD.
    pub fn announced_size(&self, name: &str) -> Option<u32> {
        self.state.lock().unwrap().announced.get(name).copied()
    }

    pub fn break_download_at(&self, start: u32) {
        self.state.lock().unwrap().broken_starts.insert(start);
    }

    pub fn break_upload_at(&self, start: u32) {
        self.state.lock().unwrap().broken_upload_starts.insert(start);
    }

    pub fn stall_downloads(&self) {
        self.state.lock().unwrap().stall_downloads = true;
    }

    pub fn connections(&self, command: Command) -> usize {
        self.state
            .lock()
            .unwrap()
            .connections
            .get(&command)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_connections(&self) -> usize {
        self.state.lock().unwrap().connections.values().sum()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn handle(mut stream: TcpStream, state: Arc<Mutex<State>>) -> Result<(), DataChannelError> {
    let header = decode_header(&recv_exact(&mut stream, HEADER_LEN).await?)?;
    *state
        .lock()
        .unwrap()
        .connections
        .entry(header.command)
        .or_default() += 1;

    let payload = recv_exact(&mut stream, header.payload_len as usize).await?;
    let name = String::from_utf8_lossy(&payload).into_owned();

    match header.command {
        Command::Ping => send_all(&mut stream, &encode_bool(true)).await,
        Command::List => {
            let listing: String = state
                .lock()
                .unwrap()
                .files
                .keys()
                .map(|n| format!("{n}\n"))
                .collect();
            send_u32(&mut stream, listing.len() as u32).await?;
            send_all(&mut stream, listing.as_bytes()).await
        }
        Command::RequestUpload => {
            let exists = state.lock().unwrap().files.contains_key(&name);
            send_all(&mut stream, &encode_bool(exists)).await?;
            if exists {
                return Ok(());
            }
            let size = recv_u32(&mut stream).await?;
            let mut st = state.lock().unwrap();
            st.announced.insert(name.clone(), size);
            st.files.insert(name, vec![0; size as usize]);
            Ok(())
        }
        Command::UploadChunk => {
            let start = recv_u32(&mut stream).await?;
            let end = recv_u32(&mut stream).await? as usize;
            let len = end - start as usize + 1;

            let broken = state.lock().unwrap().broken_upload_starts.contains(&start);
            if broken {
                // Wait until more data is queued so the close resets the
                // connection instead of ending it cleanly.
                recv_exact(&mut stream, len / 2).await?;
                stream.peek(&mut [0u8; 1]).await?;
                return Ok(());
            }

            let start = start as usize;
            let data = recv_exact(&mut stream, len).await?;

            let mut st = state.lock().unwrap();
            let file = st.files.entry(name).or_default();
            if file.len() <= end {
                file.resize(end + 1, 0);
            }
            file[start..=end].copy_from_slice(&data);
            Ok(())
        }
        Command::RequestDownload => {
            let size = state.lock().unwrap().files.get(&name).map(Vec::len);
            let reply = DownloadReply {
                exists: size.is_some(),
                size: size.unwrap_or(0) as u32,
            };
            send_all(&mut stream, &reply.encode()).await
        }
        Command::DownloadChunk => {
            let start = recv_u32(&mut stream).await?;
            let end = recv_u32(&mut stream).await?;
            let (data, broken, stall) = {
                let st = state.lock().unwrap();
                let file = st.files.get(&name).cloned().unwrap_or_default();
                let data = file[start as usize..=end as usize].to_vec();
                (data, st.broken_starts.contains(&start), st.stall_downloads)
            };
            if stall {
                send_all(&mut stream, &data[..data.len().min(5)]).await?;
                return await_close(&mut stream).await;
            }
            if broken {
                send_all(&mut stream, &data[..data.len() / 2]).await
            } else {
                send_all(&mut stream, &data).await
            }
        }
        Command::Delete => {
            let existed = state.lock().unwrap().files.remove(&name).is_some();
            send_all(&mut stream, &encode_bool(existed)).await
        }
    }
}
