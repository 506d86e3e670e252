//! Connection abstraction consumed by the hub client core.
//!
//! A connection is a bidirectional framed stream. It is split once into an
//! owned reader half and an owned writer half so that one task can block on
//! reads while another writes, without a lock around the stream.
//!
//! Specific backends (in-memory, WebSocket) are provided in separate crates.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod frame;
mod request;

pub use error::{Error, Result};
pub use frame::{Frame, RawFrame};
pub use request::RequestInfo;

use async_trait::async_trait;
use bytes::Bytes;

/// Read half of a connection.
#[async_trait]
pub trait FrameReader: Send + 'static {
    /// Reads the next text frame.
    ///
    /// Blocks until a frame arrives, an error occurs or the stream ends.
    /// End of stream is reported as [`Error::Closed`]; every other error is
    /// transient and the caller may read again.
    async fn read_text(&mut self) -> Result<String>;
}

/// Write half of a connection.
#[async_trait]
pub trait FrameWriter: Send + 'static {
    /// Writes one frame.
    async fn write_frame(&mut self, frame: Frame) -> Result<()>;

    /// Writes a pre-framed payload unchanged.
    async fn write_raw(&mut self, frame: RawFrame) -> Result<()> {
        self.write_frame(frame.into()).await
    }

    /// Writes a ping control frame with an empty payload.
    ///
    /// Used as a liveness probe: a successful ping shows the connection
    /// accepts writes.
    async fn ping(&mut self) -> Result<()> {
        self.write_frame(Frame::Ping(Bytes::new())).await
    }

    /// Closes the write direction. Backends without a close handshake do nothing.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A live, not yet split connection.
pub trait Connection: Send + 'static {
    /// Read half type.
    type Reader: FrameReader;

    /// Write half type.
    type Writer: FrameWriter;

    /// Metadata of the originating request.
    fn request(&self) -> &RequestInfo;

    /// Splits the connection into its read and write halves.
    fn split(self) -> (Self::Reader, Self::Writer);
}
