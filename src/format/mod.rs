use crate::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub mod ts;

/// Receives the extracted elementary-stream bytes for one PID.
///
/// Fragments arrive in exactly the order the assembler emitted them;
/// appending them back to back reconstructs the elementary stream.
#[async_trait::async_trait]
pub trait StreamSink: Send {
    /// Append one payload fragment to the output.
    async fn append(&mut self, fragment: &[u8]) -> Result<()>;

    /// Flush buffered output, if any.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink writing fragments to anything `AsyncWrite`: a file, a socket,
/// or a plain `Vec<u8>`.
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W> {
    /// Wraps a writer as a fragment sink.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> StreamSink for WriterSink<W> {
    async fn append(&mut self, fragment: &[u8]) -> Result<()> {
        self.writer.write_all(fragment).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// In-memory sink with a clonable handle to the captured bytes, handy
/// when the demuxer owns the sink but the caller wants the output.
#[derive(Clone, Default)]
pub struct MemorySink {
    data: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes captured so far.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// True when nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Takes the captured bytes out, leaving the sink empty.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.data.lock())
    }
}

#[async_trait::async_trait]
impl StreamSink for MemorySink {
    async fn append(&mut self, fragment: &[u8]) -> Result<()> {
        self.data.lock().extend_from_slice(fragment);
        Ok(())
    }
}

pub use self::ts::TSDemuxer;
