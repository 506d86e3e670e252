//! End-to-end tests over real WebSocket connections

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use serde_json::json;
use tokio::time::timeout;
use tracing::info;
use wshub_client::{Client, Error, Hub, Message, PassThrough};
use wshub_connection::{Connection, Frame, FrameReader, FrameWriter};
use wshub_connection_ws::{ClientConnection, WebSocketListener};

const WAIT: Duration = Duration::from_secs(5);

struct LoggingHub;

impl Hub for LoggingHub {
    fn error_observer(&self, error: Error) {
        info!("hub observed: {}", error);
    }
}

#[tokio::test]
async fn test_client_over_websocket() {
    let _ = tracing_subscriber::fmt::try_init();

    let listener = WebSocketListener::new();
    let app = listener.mount_into_router(Router::new(), "/ws");

    let tcp = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = tcp.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(tcp, app).await.expect("Server failed");
    });

    let hub = Arc::new(LoggingHub);

    // Hub side: wrap each accepted connection in a client that echoes in upper case
    let hub_task = tokio::spawn(async move {
        let conn = timeout(WAIT, listener.accept())
            .await
            .expect("Accept timeout")
            .expect("Failed to accept");

        let client = Client::new(&hub, conn).await.expect("Probe failed");
        let handle = client.handle();

        let echo = client.handle();
        let handler = move |text: String| {
            echo.send(json!({ "echo": text.to_uppercase() }))
                .expect("Queue full");
        };

        let exit = client.run(handler, PassThrough).await;
        assert_eq!(exit.client_id, handle.id());
        exit
    });

    let conn = ClientConnection::connect(format!("ws://{addr}/ws"))
        .await
        .expect("Failed to connect");
    let (mut reader, mut writer) = conn.split();

    for word in ["hello", "hub"] {
        writer
            .write_frame(Frame::Text(word.to_string()))
            .await
            .unwrap();

        // The probe ping is answered by the library and never surfaces here
        let reply = timeout(WAIT, reader.read_text()).await.unwrap().unwrap();
        let reply: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply, json!({ "echo": word.to_uppercase() }));
    }

    writer.close().await.unwrap();

    let exit = timeout(WAIT, hub_task).await.unwrap().unwrap();
    assert_eq!(exit.reason.as_deref(), Some("client closed"));

    server.abort();
}

#[tokio::test]
async fn test_raw_messages_over_websocket() {
    let _ = tracing_subscriber::fmt::try_init();

    let listener = WebSocketListener::new();
    let app = listener.mount_into_router(Router::new(), "/ws");

    let tcp = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(tcp, app).await.expect("Server failed");
    });

    let hub = Arc::new(LoggingHub);
    let hub_task = tokio::spawn(async move {
        let conn = listener.accept().await.unwrap();
        let client = Client::new(&hub, conn).await.unwrap();
        let handle = client.handle();

        handle.send(Message::text("raw text")).unwrap();
        handle.send(Message::text("second")).unwrap();

        client.run(|_: String| {}, PassThrough).await
    });

    let conn = ClientConnection::connect(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    let (mut reader, mut writer) = conn.split();

    assert_eq!(timeout(WAIT, reader.read_text()).await.unwrap().unwrap(), "raw text");
    assert_eq!(timeout(WAIT, reader.read_text()).await.unwrap().unwrap(), "second");

    writer.close().await.unwrap();
    let exit = timeout(WAIT, hub_task).await.unwrap().unwrap();
    assert_eq!(exit.reason.as_deref(), Some("client closed"));

    server.abort();
}
