use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;

/// Destination of the target program's stdout.
pub trait OutputSink: AsyncWrite + Unpin + Send {
    /// Consume the sink and return what it captured.
    fn into_output(self: Box<Self>) -> Vec<u8>;
}

/// Buffers the whole stdout.
#[derive(Debug, Default)]
pub struct TextSink {
    buf: Vec<u8>,
}

/// Feeds stdout into SHA-256 without keeping it.
#[derive(Default)]
pub struct DigestSink {
    hasher: Sha256,
}

impl AsyncWrite for TextSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buf.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl OutputSink for TextSink {
    fn into_output(self: Box<Self>) -> Vec<u8> {
        self.buf
    }
}

impl AsyncWrite for DigestSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.hasher.update(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl OutputSink for DigestSink {
    fn into_output(self: Box<Self>) -> Vec<u8> {
        format!("{:x}", self.hasher.finalize()).into_bytes()
    }
}

/// Output capture strategy, fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureMode {
    /// Compare against `.out` files holding the raw output.
    #[default]
    Text,
    /// Compare against `.hash` files holding the hex SHA-256 of the output.
    Digest,
}

impl CaptureMode {
    pub fn from_hash_flag(hash: bool) -> Self {
        if hash {
            Self::Digest
        } else {
            Self::Text
        }
    }

    /// Extension of the expected-output file, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "out",
            Self::Digest => "hash",
        }
    }

    pub fn new_sink(self) -> Box<dyn OutputSink> {
        match self {
            Self::Text => Box::<TextSink>::default(),
            Self::Digest => Box::<DigestSink>::default(),
        }
    }
}
