//! Integration tests for memory connections

use std::time::Duration;

use tokio::time::timeout;
use tracing::info;
use wshub_connection::{Connection, Frame, FrameReader, FrameWriter, RequestInfo};
use wshub_connection_memory::{MemoryConnection, MemoryOptions};

#[tokio::test]
async fn test_memory_echo() {
    let _ = tracing_subscriber::fmt::try_init();

    let (connection, mut peer) = MemoryConnection::pair();
    let (mut reader, mut writer) = connection.split();

    // Echo every text frame back until the stream ends
    let echo_task = tokio::spawn(async move {
        loop {
            match reader.read_text().await {
                Ok(text) => {
                    info!("Echoing {} bytes", text.len());
                    if let Err(e) = writer.write_frame(Frame::Text(text)).await {
                        info!("Echo send error: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    info!("Echo receive error: {}", e);
                    break;
                }
            }
        }
    });

    let test_messages = vec!["Hello, Memory!", "Test message 2", "🦀 Rust is awesome!"];

    for msg in test_messages {
        peer.send_text(msg).await.expect("Failed to send");

        let response = timeout(Duration::from_secs(1), peer.recv())
            .await
            .expect("Timeout")
            .expect("Failed to receive");

        assert_eq!(Frame::Text(msg.to_string()), response);
    }

    peer.close();
    timeout(Duration::from_secs(1), echo_task)
        .await
        .expect("Echo task did not stop")
        .expect("Echo task panicked");

    // Writer was dropped with the echo task
    assert!(peer.recv().await.unwrap_err().is_closed());
}

#[tokio::test]
async fn test_read_error_is_transient() {
    let _ = tracing_subscriber::fmt::try_init();

    let (connection, peer) = MemoryConnection::pair();
    let (mut reader, _writer) = connection.split();

    peer.inject_read_error("bad frame").await.unwrap();
    peer.send_text("still alive").await.unwrap();

    let err = reader.read_text().await.unwrap_err();
    assert!(!err.is_closed());
    assert_eq!(err.to_string(), "bad frame");
    assert_eq!(reader.read_text().await.unwrap(), "still alive");
}

#[tokio::test]
async fn test_request_metadata() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut request = RequestInfo::default();
    request
        .headers
        .insert("x-client", "dashboard".parse().unwrap());

    let (connection, _peer) = MemoryConnection::pair_with(MemoryOptions {
        request,
        ..MemoryOptions::default()
    });

    assert_eq!(connection.request().header("x-client"), Some("dashboard"));
    assert_eq!(connection.request().uri, "/");
}
