use thiserror::Error;

/// Result type alias for connection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by a connection's reader or writer half.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream has ended. Reads return this once the peer goes away.
    #[error("connection closed")]
    Closed,

    /// An I/O error on the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The peer violated the framing protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Backend specific failure.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error marks the end of the stream rather than a transient failure.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_closed_is_end_of_stream() {
        assert!(Error::Closed.is_closed());
        assert!(!Error::Protocol("bad opcode".to_string()).is_closed());
        assert!(!Error::Io(std::io::Error::other("reset")).is_closed());
    }
}
