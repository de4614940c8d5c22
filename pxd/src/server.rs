//! Accepts connections on a Unix domain socket. Framing is one request,
//! one response, then close: the client does not need a persistent
//! session and request ordering on the wire is total.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::task::JoinSet;

use crate::handler::Handler;
use crate::runtime::Stopper;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind socket: {0}")]
    Bind(String),

    #[error("accept failed: {0}")]
    Accept(String),
}

pub struct Server {
    listener: UnixListener,
    handler: Arc<Handler>,
}

impl Server {
    pub fn bind(socket_path: &Path, handler: Handler) -> Result<Self, ServerError> {
        let listener =
            UnixListener::bind(socket_path).map_err(|err| ServerError::Bind(err.to_string()))?;
        Ok(Server {
            listener,
            handler: Arc::new(handler),
        })
    }

    /// Runs the accept loop until `stop` fires. A shutdown trigger does
    /// not interrupt a request already being handled: in-flight
    /// connections run on their own spawned task, and `serve` does not
    /// return until every one of them — including the connection that
    /// delivered the `stop` request itself — has finished writing its
    /// response.
    pub async fn serve(self, stop: Arc<Stopper>) -> Result<(), ServerError> {
        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, _addr) = accepted.map_err(|err| ServerError::Accept(err.to_string()))?;
                    let handler = self.handler.clone();
                    connections.spawn(async move {
                        if let Err(err) = serve_connection(stream, handler).await {
                            tracing::warn!(error = %err, "connection handling failed");
                        }
                    });
                }
                () = stop.wait() => {
                    break;
                }
            }
        }
        while connections.join_next().await.is_some() {}
        Ok(())
    }
}

/// Reads one LF-terminated request line (CR trimmed), dispatches it, and
/// writes back one LF-terminated response line. Generic over the stream
/// type so it can be driven by an in-memory stream in tests.
async fn serve_connection<S>(stream: S, handler: Arc<Handler>) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line).await?;
    if bytes_read == 0 {
        return Ok(());
    }
    let request_line = line.trim_end_matches(['\n', '\r']);
    let response = handler.handle(request_line).await;

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await?;
    Ok(())
}
