use http::{HeaderMap, Method, Uri};

/// Metadata of the request a connection originated from.
///
/// Kept for diagnostics: error messages and observers use it to tell
/// connections apart.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    /// Request method, `GET` for upgraded connections.
    pub method: Method,

    /// Request target.
    pub uri: Uri,

    /// Request headers as seen during the handshake.
    pub headers: HeaderMap,
}

impl RequestInfo {
    /// Creates request metadata from its parts.
    #[must_use]
    pub const fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// Returns the value of a header if it is present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

impl Default for RequestInfo {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::from_static("/"),
            headers: HeaderMap::new(),
        }
    }
}
