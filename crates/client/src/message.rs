use bytes::Bytes;
use serde::Serialize;
use wshub_connection::RawFrame;

/// An outbound message.
///
/// The producer decides how a message goes out: raw payloads are written
/// unchanged, structured values are encoded as JSON text frames.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Pre-framed text or binary payload.
    Raw(RawFrame),

    /// Value serialized to JSON when written.
    Structured(serde_json::Value),
}

impl Message {
    /// A raw text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Raw(RawFrame::Text(text.into()))
    }

    /// A raw binary message.
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self::Raw(RawFrame::Binary(data.into()))
    }

    /// A structured message built from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Self::Structured)
    }
}

impl From<RawFrame> for Message {
    fn from(raw: RawFrame) -> Self {
        Self::Raw(raw)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<Bytes> for Message {
    fn from(data: Bytes) -> Self {
        Self::binary(data)
    }
}

impl From<Vec<u8>> for Message {
    fn from(data: Vec<u8>) -> Self {
        Self::binary(data)
    }
}

impl From<serde_json::Value> for Message {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_strings_and_bytes_are_raw() {
        assert_eq!(Message::from("hi"), Message::Raw(RawFrame::Text("hi".to_string())));
        assert_eq!(
            Message::from(vec![7u8]),
            Message::Raw(RawFrame::Binary(Bytes::from_static(&[7])))
        );
    }

    #[test]
    fn test_json_values_are_structured() {
        #[derive(Serialize)]
        struct Presence<'a> {
            user: &'a str,
            online: bool,
        }

        let message = Message::json(&Presence {
            user: "ada",
            online: true,
        })
        .unwrap();

        assert_eq!(
            message,
            Message::Structured(json!({ "user": "ada", "online": true }))
        );
    }
}
