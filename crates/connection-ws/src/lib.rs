//! WebSocket connection implementations
//!
//! - For accepting: [`WebSocketListener`] provides an Axum route that can be
//!   mounted into an existing server; upgraded sockets are handed out by
//!   [`WebSocketListener::accept`].
//! - For dialing: [`ClientConnection::connect`] uses a standard WebSocket
//!   client connection.
//!
//! Both connection types split into an independent sink and stream, so the
//! read and write halves never share a lock.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod server;

pub use client::{ClientConnection, ClientReader, ClientWriter};
pub use server::{ServerConnection, ServerReader, ServerWriter, WebSocketListener};
