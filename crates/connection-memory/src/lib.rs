//! In-memory connection implementation for testing
//!
//! A [`MemoryConnection`] is created together with a [`MemoryPeer`] that plays
//! the remote end: it feeds frames (or read errors) to the connection, sees
//! every frame the connection writes, can make writes fail, and can end the
//! stream.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;
use wshub_connection::{Connection, Error, Frame, FrameReader, FrameWriter, RequestInfo, Result};

/// Configuration for memory connections
#[derive(Clone, Debug)]
pub struct MemoryOptions {
    /// Request metadata reported by the connection.
    pub request: RequestInfo,

    /// Capacity of each direction's channel.
    pub capacity: usize,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            request: RequestInfo::default(),
            capacity: 100,
        }
    }
}

/// What the peer pushes towards the connection's reader.
#[derive(Debug)]
enum Inbound {
    Frame(Frame),
    Error(String),
}

/// Memory connection implementation
pub struct MemoryConnection {
    id: Uuid,
    request: RequestInfo,
    inbound_rx: flume::Receiver<Inbound>,
    outbound_tx: flume::Sender<Frame>,
    writable: Arc<AtomicBool>,
}

impl MemoryConnection {
    /// Creates a connection and its peer with default options.
    #[must_use]
    pub fn pair() -> (Self, MemoryPeer) {
        Self::pair_with(MemoryOptions::default())
    }

    /// Creates a connection and its peer.
    #[must_use]
    pub fn pair_with(options: MemoryOptions) -> (Self, MemoryPeer) {
        let (inbound_tx, inbound_rx) = flume::bounded(options.capacity);
        let (outbound_tx, outbound_rx) = flume::bounded(options.capacity);
        let writable = Arc::new(AtomicBool::new(true));
        let id = Uuid::new_v4();

        debug!("Memory connection {} created", id);

        let connection = Self {
            id,
            request: options.request,
            inbound_rx,
            outbound_tx,
            writable: writable.clone(),
        };

        let peer = MemoryPeer {
            id,
            inbound_tx: Some(inbound_tx),
            outbound_rx,
            writable,
        };

        (connection, peer)
    }

    /// Connection identifier shared with its peer.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }
}

impl Debug for MemoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("id", &self.id)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl Connection for MemoryConnection {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn request(&self) -> &RequestInfo {
        &self.request
    }

    fn split(self) -> (MemoryReader, MemoryWriter) {
        let reader = MemoryReader {
            id: self.id,
            rx: self.inbound_rx,
        };
        let writer = MemoryWriter {
            id: self.id,
            tx: Some(self.outbound_tx),
            writable: self.writable,
        };
        (reader, writer)
    }
}

/// Read half of a [`MemoryConnection`].
#[derive(Debug)]
pub struct MemoryReader {
    id: Uuid,
    rx: flume::Receiver<Inbound>,
}

#[async_trait]
impl FrameReader for MemoryReader {
    async fn read_text(&mut self) -> Result<String> {
        loop {
            match self.rx.recv_async().await {
                Ok(Inbound::Frame(Frame::Text(text))) => {
                    debug!("Memory connection {} received {} bytes", self.id, text.len());
                    return Ok(text);
                }
                Ok(Inbound::Frame(frame)) => {
                    // Only text frames are delivered
                    debug!("Memory connection {} skipping {:?}", self.id, frame);
                }
                Ok(Inbound::Error(message)) => return Err(Error::Other(message)),
                Err(_) => return Err(Error::Closed),
            }
        }
    }
}

/// Write half of a [`MemoryConnection`].
#[derive(Debug)]
pub struct MemoryWriter {
    id: Uuid,
    tx: Option<flume::Sender<Frame>>,
    writable: Arc<AtomicBool>,
}

#[async_trait]
impl FrameWriter for MemoryWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::Closed)?;

        if !self.writable.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "memory connection is not writable",
            )));
        }

        debug!("Memory connection {} sending {:?}", self.id, frame);

        tx.send_async(frame).await.map_err(|_| Error::Closed)
    }

    async fn close(&mut self) -> Result<()> {
        debug!("Closing memory connection {}", self.id);
        self.tx = None;
        Ok(())
    }
}

/// Remote end of a [`MemoryConnection`].
pub struct MemoryPeer {
    id: Uuid,
    inbound_tx: Option<flume::Sender<Inbound>>,
    outbound_rx: flume::Receiver<Frame>,
    writable: Arc<AtomicBool>,
}

impl MemoryPeer {
    /// Sends a text frame to the connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the peer was closed or the reader is gone.
    pub async fn send_text(&self, text: impl Into<String> + Send) -> Result<()> {
        self.push(Inbound::Frame(Frame::Text(text.into()))).await
    }

    /// Sends a binary frame to the connection. Readers skip it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the peer was closed or the reader is gone.
    pub async fn send_binary(&self, data: impl Into<Bytes> + Send) -> Result<()> {
        self.push(Inbound::Frame(Frame::Binary(data.into()))).await
    }

    /// Makes the connection's next read fail with a transient error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the peer was closed or the reader is gone.
    pub async fn inject_read_error(&self, message: impl Into<String> + Send) -> Result<()> {
        self.push(Inbound::Error(message.into())).await
    }

    /// Controls whether the connection's writes succeed.
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }

    /// Ends the stream. The connection's reader returns [`Error::Closed`]
    /// once the frames already sent are consumed.
    pub fn close(&mut self) {
        debug!("Memory peer {} closing", self.id);
        self.inbound_tx = None;
    }

    /// Waits for the next frame the connection wrote.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] once the writer is closed or dropped and all
    /// written frames were received.
    pub async fn recv(&self) -> Result<Frame> {
        self.outbound_rx
            .recv_async()
            .await
            .map_err(|_| Error::Closed)
    }

    /// Returns every frame written so far without waiting.
    #[must_use]
    pub fn drain(&self) -> Vec<Frame> {
        self.outbound_rx.try_iter().collect()
    }

    async fn push(&self, inbound: Inbound) -> Result<()> {
        let tx = self.inbound_tx.as_ref().ok_or(Error::Closed)?;
        tx.send_async(inbound).await.map_err(|_| Error::Closed)
    }
}

impl Debug for MemoryPeer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPeer")
            .field("id", &self.id)
            .field("closed", &self.inbound_tx.is_none())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bidirectional_frames() {
        let _ = tracing_subscriber::fmt::try_init();

        let (connection, peer) = MemoryConnection::pair();
        let (mut reader, mut writer) = connection.split();

        peer.send_text("Hello, Memory!").await.unwrap();
        assert_eq!(reader.read_text().await.unwrap(), "Hello, Memory!");

        writer
            .write_frame(Frame::Text("Hello back!".to_string()))
            .await
            .unwrap();
        assert_eq!(
            peer.recv().await.unwrap(),
            Frame::Text("Hello back!".to_string())
        );
    }

    #[tokio::test]
    async fn test_binary_frames_are_skipped() {
        let _ = tracing_subscriber::fmt::try_init();

        let (connection, peer) = MemoryConnection::pair();
        let (mut reader, _writer) = connection.split();

        peer.send_binary(vec![0u8, 1, 2]).await.unwrap();
        peer.send_text("after").await.unwrap();

        assert_eq!(reader.read_text().await.unwrap(), "after");
    }

    #[tokio::test]
    async fn test_close_ends_stream_after_pending_frames() {
        let _ = tracing_subscriber::fmt::try_init();

        let (connection, mut peer) = MemoryConnection::pair();
        let (mut reader, _writer) = connection.split();

        peer.send_text("last").await.unwrap();
        peer.close();

        assert_eq!(reader.read_text().await.unwrap(), "last");
        assert!(reader.read_text().await.unwrap_err().is_closed());
        assert!(peer.send_text("too late").await.is_err());
    }

    #[tokio::test]
    async fn test_unwritable_connection() {
        let _ = tracing_subscriber::fmt::try_init();

        let (connection, peer) = MemoryConnection::pair();
        let (_reader, mut writer) = connection.split();

        peer.set_writable(false);
        let err = writer.ping().await.unwrap_err();
        assert!(!err.is_closed());
        assert!(peer.drain().is_empty());

        peer.set_writable(true);
        writer.ping().await.unwrap();
        assert_eq!(peer.drain(), vec![Frame::Ping(Bytes::new())]);
    }

    #[tokio::test]
    async fn test_writer_close_ends_peer_stream() {
        let _ = tracing_subscriber::fmt::try_init();

        let (connection, peer) = MemoryConnection::pair();
        let (_reader, mut writer) = connection.split();

        writer.close().await.unwrap();
        assert!(peer.recv().await.unwrap_err().is_closed());
        assert!(
            writer
                .write_frame(Frame::Text("x".to_string()))
                .await
                .unwrap_err()
                .is_closed()
        );
    }
}
