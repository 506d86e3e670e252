use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use http::{HeaderMap, Method, Uri};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info};
use wshub_connection::{Connection, Error, Frame, FrameReader, FrameWriter, RequestInfo, Result};

/// Listener that receives connections from the Axum handler
#[derive(Debug, Clone)]
pub struct WebSocketListener {
    connection_rx: Arc<Mutex<mpsc::Receiver<ServerConnection>>>,
    connection_tx: mpsc::Sender<ServerConnection>,
}

impl WebSocketListener {
    /// Create a new listener with no route mounted yet
    #[must_use]
    pub fn new() -> Self {
        let (connection_tx, connection_rx) = mpsc::channel(100);

        Self {
            connection_rx: Arc::new(Mutex::new(connection_rx)),
            connection_tx,
        }
    }

    /// Waits for the next upgraded connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the connection channel has shut down.
    pub async fn accept(&self) -> Result<ServerConnection> {
        let mut rx = self.connection_rx.lock().await;
        rx.recv().await.ok_or(Error::Closed)
    }

    /// Mount a WebSocket endpoint into an Axum router
    #[must_use]
    pub fn mount_into_router(&self, router: Router, path: &str) -> Router {
        let connection_tx = self.connection_tx.clone();

        // Create the handler inline to avoid complex type signatures
        let handler = move |ws: WebSocketUpgrade, method: Method, uri: Uri, headers: HeaderMap| {
            let connection_tx = connection_tx.clone();

            async move {
                let request = RequestInfo::new(method, uri, headers);

                ws.on_upgrade(move |socket| async move {
                    debug!("WebSocket upgraded for {}", request.uri);

                    let conn = ServerConnection::new(request, socket);
                    if connection_tx.send(conn).await.is_err() {
                        error!("Failed to send connection to listener");
                    }
                })
            }
        };

        info!("WebSocket route mounted at {}", path);

        router.route(path, axum::routing::get(handler))
    }
}

impl Default for WebSocketListener {
    fn default() -> Self {
        Self::new()
    }
}

/// Server-side connection upgraded through Axum
pub struct ServerConnection {
    request: RequestInfo,
    socket: WebSocket,
}

impl ServerConnection {
    const fn new(request: RequestInfo, socket: WebSocket) -> Self {
        Self { request, socket }
    }
}

impl Debug for ServerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConnection")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl Connection for ServerConnection {
    type Reader = ServerReader;
    type Writer = ServerWriter;

    fn request(&self) -> &RequestInfo {
        &self.request
    }

    fn split(self) -> (ServerReader, ServerWriter) {
        let (sink, stream) = self.socket.split();
        (ServerReader { stream }, ServerWriter { sink })
    }
}

/// Read half of a [`ServerConnection`].
pub struct ServerReader {
    stream: SplitStream<WebSocket>,
}

impl Debug for ServerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerReader").finish_non_exhaustive()
    }
}

#[async_trait]
impl FrameReader for ServerReader {
    async fn read_text(&mut self) -> Result<String> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | None => return Err(Error::Closed),
                Some(Ok(_)) => {
                    // Ignore other message types (Binary, Ping, Pong)
                }
                Some(Err(e)) => return Err(Error::Other(e.to_string())),
            }
        }
    }
}

/// Write half of a [`ServerConnection`].
pub struct ServerWriter {
    sink: SplitSink<WebSocket, Message>,
}

impl Debug for ServerWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerWriter").finish_non_exhaustive()
    }
}

#[async_trait]
impl FrameWriter for ServerWriter {
    async fn write_frame(&mut self, frame: Frame) -> Result<()> {
        let message = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data),
            Frame::Ping(data) => Message::Ping(data),
        };

        self.sink
            .send(message)
            .await
            .map_err(|e| Error::Other(e.to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.sink
            .close()
            .await
            .map_err(|e| Error::Other(e.to_string()))
    }
}
