//! Per-connection client core of a WebSocket hub.
//!
//! A [`Client`] owns one connection and drives it with two concurrent loops:
//!
//! - the [`ReceiverLoop`] reads text frames and hands each one to a
//!   [`FrameHandler`], one at a time;
//! - the [`SenderLoop`] drains a bounded outbound queue, runs every message
//!   through a [`MessageFilter`], and writes what survives.
//!
//! Both loops share a set-once shutdown signal. End of stream on the read
//! side, a closed outbound queue, or any call to
//! [`ClientHandle::request_shutdown`] trips it, and both loops return.
//!
//! Accepting connections and keeping the set of members belongs to the hub.
//! The client only needs the hub's [`Hub::error_observer`] for errors that do
//! not stop the loops.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod error;
mod filter;
mod handler;
mod hub;
mod id;
mod message;
mod options;
mod receiver;
mod sender;
mod shutdown;

pub use client::{Client, ClientExit, ClientHandle};
pub use error::{Error, Result};
pub use filter::{FilterError, MessageFilter, PassThrough};
pub use handler::FrameHandler;
pub use hub::Hub;
pub use id::ClientId;
pub use message::Message;
pub use options::{ClientOptions, DEFAULT_QUEUE_CAPACITY};
pub use receiver::ReceiverLoop;
pub use sender::SenderLoop;

// Re-export connection types that are part of our public API
pub use wshub_connection::{Connection, RawFrame, RequestInfo};
