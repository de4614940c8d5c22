use std::cmp::min;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// An in-memory stand-in for a Unix socket connection, used to drive the
/// server's connection handler without binding a real socket.
#[derive(Debug, Default)]
pub struct MockStream {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
}

impl MockStream {
    pub fn from_input(input: &str) -> Self {
        MockStream {
            read_data: input.as_bytes().to_vec(),
            write_data: Vec::new(),
        }
    }

    pub fn output(&self) -> String {
        String::from_utf8(self.write_data.clone()).expect("response bytes are valid UTF-8")
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let size = min(this.read_data.len(), buf.remaining());
        buf.put_slice(&this.read_data[..size]);
        this.read_data.drain(..size);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.get_mut().write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
