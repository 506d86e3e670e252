use http::HeaderMap;
use thiserror::Error;

use crate::ClientId;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by a client.
#[derive(Debug, Error)]
pub enum Error {
    /// The liveness probe at construction failed; no client was created.
    #[error("wshub client {client_id}: liveness probe failed: {source}")]
    Probe {
        /// Id the client would have had.
        client_id: ClientId,
        /// The failed write.
        #[source]
        source: wshub_connection::Error,
    },

    /// A read failed without ending the stream.
    #[error("wshub client {client_id}: read failed: {source}")]
    Read {
        /// Client that read.
        client_id: ClientId,
        /// The failed read.
        #[source]
        source: wshub_connection::Error,
    },

    /// Writing an outbound message failed.
    #[error("wshub client {client_id}: write failed: {source}")]
    Write {
        /// Client that wrote.
        client_id: ClientId,
        /// The failed write.
        #[source]
        source: wshub_connection::Error,
    },

    /// A structured message could not be serialized.
    #[error("wshub client {client_id}: failed to encode message: {source}")]
    Encode {
        /// Client that encoded.
        client_id: ClientId,
        /// The serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// The outbound queue is at capacity.
    #[error("wshub client {client_id}: outbound queue full ({capacity} pending): {headers:?}")]
    QueueFull {
        /// Client whose queue is full.
        client_id: ClientId,
        /// Queue capacity.
        capacity: usize,
        /// Request headers of the connection.
        headers: HeaderMap,
    },

    /// The client has shut down and no longer accepts messages.
    #[error("wshub client {client_id}: client closed: {headers:?}")]
    Closed {
        /// Client that is closed.
        client_id: ClientId,
        /// Request headers of the connection.
        headers: HeaderMap,
    },

    /// One of the client's loops panicked.
    #[error("wshub client {client_id}: {task} loop panicked")]
    LoopPanicked {
        /// Client whose loop panicked.
        client_id: ClientId,
        /// Which loop, `receiver` or `sender`.
        task: &'static str,
    },
}

impl Error {
    /// The client this error belongs to.
    #[must_use]
    pub const fn client_id(&self) -> ClientId {
        match self {
            Self::Probe { client_id, .. }
            | Self::Read { client_id, .. }
            | Self::Write { client_id, .. }
            | Self::Encode { client_id, .. }
            | Self::QueueFull { client_id, .. }
            | Self::Closed { client_id, .. }
            | Self::LoopPanicked { client_id, .. } => *client_id,
        }
    }
}
