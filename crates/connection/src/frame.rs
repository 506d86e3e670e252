use bytes::Bytes;

/// A pre-framed payload written to the connection unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawFrame {
    /// UTF-8 text payload.
    Text(String),

    /// Opaque binary payload.
    Binary(Bytes),
}

impl RawFrame {
    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(data) => data.len(),
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for RawFrame {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RawFrame {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for RawFrame {
    fn from(data: Bytes) -> Self {
        Self::Binary(data)
    }
}

impl From<Vec<u8>> for RawFrame {
    fn from(data: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(data))
    }
}

/// One discrete unit written to a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Text data frame.
    Text(String),

    /// Binary data frame.
    Binary(Bytes),

    /// Control frame asking the peer for a pong.
    Ping(Bytes),
}

impl From<RawFrame> for Frame {
    fn from(raw: RawFrame) -> Self {
        match raw {
            RawFrame::Text(text) => Self::Text(text),
            RawFrame::Binary(data) => Self::Binary(data),
        }
    }
}
