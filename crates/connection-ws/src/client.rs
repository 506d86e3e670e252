use std::fmt::Debug;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use wshub_connection::{Connection, Error, Frame, FrameReader, FrameWriter, RequestInfo, Result};

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connection for client-side connections
pub struct ClientConnection {
    request: RequestInfo,
    ws_stream: Stream,
}

impl ClientConnection {
    /// Dials a WebSocket server.
    ///
    /// Accepts anything tungstenite can turn into a handshake request (a URL
    /// string or a prepared `http::Request<()>` with extra headers). The
    /// request sent is kept as the connection's [`RequestInfo`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or the handshake fails.
    pub async fn connect<R>(request: R) -> Result<Self>
    where
        R: IntoClientRequest + Send,
    {
        let request = request.into_client_request().map_err(map_error)?;
        let info = RequestInfo::new(
            request.method().clone(),
            request.uri().clone(),
            request.headers().clone(),
        );

        debug!("Connecting to WebSocket at {}", info.uri);

        let (ws_stream, _) = connect_async(request).await.map_err(map_error)?;

        Ok(Self {
            request: info,
            ws_stream,
        })
    }
}

impl Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl Connection for ClientConnection {
    type Reader = ClientReader;
    type Writer = ClientWriter;

    fn request(&self) -> &RequestInfo {
        &self.request
    }

    fn split(self) -> (ClientReader, ClientWriter) {
        let (sink, stream) = self.ws_stream.split();
        (ClientReader { stream }, ClientWriter { sink })
    }
}

/// Read half of a [`ClientConnection`].
pub struct ClientReader {
    stream: SplitStream<Stream>,
}

impl Debug for ClientReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientReader").finish_non_exhaustive()
    }
}

#[async_trait]
impl FrameReader for ClientReader {
    async fn read_text(&mut self) -> Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | None => return Err(Error::Closed),
                Some(Ok(_)) => {
                    // Ignore other message types (Binary, Ping, Pong, raw frames)
                }
                Some(Err(e)) => return Err(map_error(e)),
            }
        }
    }
}

/// Write half of a [`ClientConnection`].
pub struct ClientWriter {
    sink: SplitSink<Stream, Message>,
}

impl Debug for ClientWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientWriter").finish_non_exhaustive()
    }
}

#[async_trait]
impl FrameWriter for ClientWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<()> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data),
            Frame::Ping(data) => Message::Ping(data),
        };

        self.sink.send(message).await.map_err(map_error)
    }

    async fn close(&mut self) -> Result<()> {
        self.sink.close().await.map_err(map_error)
    }
}

fn map_error(error: tungstenite::Error) -> Error {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => Error::Closed,
        tungstenite::Error::Io(e) => Error::Io(e),
        e => Error::Protocol(e.to_string()),
    }
}
