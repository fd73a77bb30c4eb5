use std::fmt;

use crate::ProtocolError;

/// Operation code carried in the first byte of every request.
///
/// The numeric values are shared with the server and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Ping = 0,
    List = 1,
    RequestUpload = 2,
    UploadChunk = 3,
    RequestDownload = 4,
    DownloadChunk = 5,
    Delete = 6,
}

impl Command {
    /// Every command, in code order.
    pub const ALL: [Command; 7] = [
        Command::Ping,
        Command::List,
        Command::RequestUpload,
        Command::UploadChunk,
        Command::RequestDownload,
        Command::DownloadChunk,
        Command::Delete,
    ];

    /// Returns the wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::List => "LIST",
            Command::RequestUpload => "REQUEST_UPLOAD",
            Command::UploadChunk => "UPLOAD_CHUNK",
            Command::RequestDownload => "REQUEST_DOWNLOAD",
            Command::DownloadChunk => "DOWNLOAD_CHUNK",
            Command::Delete => "DELETE",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Command::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(ProtocolError::UnknownCommand(code))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
