use std::future::Future;
use std::time::Duration;

use chunkxfer_data_channel::{DataChannelError, Endpoint, connect, with_timeout};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// Opens connections and bounds socket operations by timeout and
/// cancellation. Cheap to clone; one copy goes to every chunk task.
#[derive(Debug, Clone)]
pub(crate) struct Connector {
    pub endpoint: Endpoint,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
    pub cancel: CancellationToken,
}

impl Connector {
    pub async fn open(&self) -> Result<TcpStream, DataChannelError> {
        connect(&self.endpoint, self.connect_timeout, &self.cancel).await
    }

    /// Runs one send or receive under the I/O timeout.
    pub async fn io<T, F>(&self, fut: F) -> Result<T, DataChannelError>
    where
        F: Future<Output = Result<T, DataChannelError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DataChannelError::Cancelled),
            result = with_timeout(self.io_timeout, fut) => result,
        }
    }

    /// Same endpoint and timeouts, cancelled together with `self` or on its own.
    pub fn child(&self) -> Connector {
        Connector {
            cancel: self.cancel.child_token(),
            ..self.clone()
        }
    }
}
