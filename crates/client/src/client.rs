use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use wshub_connection::{Connection, FrameWriter, RequestInfo};

use crate::hub::HubRef;
use crate::shutdown::Shutdown;
use crate::{
    ClientId, ClientOptions, Error, FrameHandler, Hub, Message, MessageFilter, ReceiverLoop,
    Result, SenderLoop,
};

/// One connection of a hub, with its outbound queue and shutdown signal.
///
/// A client is created around a live connection and then either run as a
/// whole with [`Client::run`], or [`split`](Client::split) so that each loop
/// can be spawned separately.
pub struct Client<C: Connection> {
    handle: ClientHandle,
    reader: C::Reader,
    writer: C::Writer,
    queue: mpsc::Receiver<Message>,
    hub: HubRef,
}

impl<C: Connection> Client<C> {
    /// Creates a client with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Probe`] if the connection does not accept the
    /// liveness probe.
    pub async fn new<H: Hub>(hub: &Arc<H>, connection: C) -> Result<Self> {
        Self::with_options(hub, connection, ClientOptions::default()).await
    }

    /// Creates a client.
    ///
    /// The client keeps a weak reference to `hub` and takes ownership of
    /// `connection`. Before returning, an empty ping is written to the
    /// connection; if that write fails the connection is dropped and no
    /// client is created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Probe`] if the connection does not accept the
    /// liveness probe.
    pub async fn with_options<H: Hub>(
        hub: &Arc<H>,
        connection: C,
        options: ClientOptions,
    ) -> Result<Self> {
        let client_id = ClientId::new();
        let capacity = options.queue_capacity.max(1);
        let (queue_tx, queue) = mpsc::channel(capacity);
        let request = Arc::new(connection.request().clone());

        let (reader, mut writer) = connection.split();

        if let Err(source) = writer.ping().await {
            warn!("client {} failed liveness probe: {}", client_id, source);
            return Err(Error::Probe { client_id, source });
        }

        debug!("client {} connected from {}", client_id, request.uri);

        Ok(Self {
            handle: ClientHandle {
                client_id,
                request,
                queue: queue_tx,
                capacity,
                shutdown: Shutdown::default(),
            },
            reader,
            writer,
            queue,
            hub: HubRef::new(client_id, hub),
        })
    }

    /// The client's id.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.handle.client_id
    }

    /// Metadata of the request the connection originated from.
    #[must_use]
    pub fn request(&self) -> &RequestInfo {
        self.handle.request()
    }

    /// A handle for sending to and shutting down this client.
    #[must_use]
    pub fn handle(&self) -> ClientHandle {
        self.handle.clone()
    }

    /// Queues a message, see [`ClientHandle::send`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] or [`Error::Closed`].
    pub fn send(&self, message: impl Into<Message>) -> Result<()> {
        self.handle.send(message)
    }

    /// Requests shutdown, see [`ClientHandle::request_shutdown`].
    pub fn request_shutdown(&self, reason: impl Into<String>) -> bool {
        self.handle.request_shutdown(reason)
    }

    /// Splits the client into a handle and its two loops.
    ///
    /// Each loop is meant to run on its own task. Once both have returned
    /// the client is finished and the hub can forget it.
    #[must_use]
    pub fn split(self) -> (ClientHandle, ReceiverLoop<C::Reader>, SenderLoop<C::Writer>) {
        let client_id = self.handle.client_id;
        let shutdown = self.handle.shutdown.clone();

        let receiver = ReceiverLoop::new(client_id, self.reader, shutdown.clone(), self.hub.clone());
        let sender = SenderLoop::new(client_id, self.writer, self.queue, shutdown, self.hub);

        (self.handle, receiver, sender)
    }

    /// Runs both loops on their own tasks and waits until both have stopped.
    ///
    /// Must be called within a Tokio runtime. If either loop panics, the
    /// panic is reported to the hub and shutdown is requested so that the
    /// other loop stops too.
    pub async fn run<H, M>(self, handler: H, filter: M) -> ClientExit
    where
        H: FrameHandler,
        M: MessageFilter,
    {
        let hub = self.hub.clone();
        let (handle, receiver, sender) = self.split();

        let receiver_task = tokio::spawn(receiver.run(handler));
        let sender_task = tokio::spawn(sender.run(filter));

        tokio::join!(
            supervise(receiver_task, "receiver", &handle, &hub),
            supervise(sender_task, "sender", &handle, &hub),
        );

        debug!("client {} finished", handle.client_id);

        ClientExit {
            client_id: handle.client_id,
            reason: handle.shutdown_reason(),
        }
    }
}

impl<C: Connection> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

async fn supervise(task: JoinHandle<()>, name: &'static str, handle: &ClientHandle, hub: &HubRef) {
    if let Err(e) = task.await {
        error!("client {} {} loop failed: {}", handle.client_id, name, e);
        handle.request_shutdown(format!("{name} loop failed"));
        if e.is_panic() {
            hub.report(Error::LoopPanicked {
                client_id: handle.client_id,
                task: name,
            });
        }
    }
}

/// Cloneable handle to a client, kept by the hub in its member set.
#[derive(Clone)]
pub struct ClientHandle {
    client_id: ClientId,
    request: Arc<RequestInfo>,
    queue: mpsc::Sender<Message>,
    capacity: usize,
    shutdown: Shutdown,
}

impl ClientHandle {
    /// The client's id.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.client_id
    }

    /// Metadata of the request the connection originated from.
    #[must_use]
    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    /// Queues a message for the sender loop without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] if the outbound queue is at capacity and
    /// [`Error::Closed`] if the sender loop has stopped. The message is not
    /// queued in either case.
    pub fn send(&self, message: impl Into<Message>) -> Result<()> {
        match self.queue.try_send(message.into()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(Error::QueueFull {
                client_id: self.client_id,
                capacity: self.capacity,
                headers: self.request.headers.clone(),
            }),
            Err(TrySendError::Closed(_)) => Err(Error::Closed {
                client_id: self.client_id,
                headers: self.request.headers.clone(),
            }),
        }
    }

    /// Serializes `value` and queues it as a structured message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if `value` cannot be represented as JSON,
    /// otherwise the same errors as [`send`](Self::send).
    pub fn send_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let message = Message::json(value).map_err(|source| Error::Encode {
            client_id: self.client_id,
            source,
        })?;
        self.send(message)
    }

    /// Asks both loops to stop.
    ///
    /// Never blocks. Only the first request is recorded; while it is pending
    /// later requests are dropped. Returns `true` if this call was the first.
    pub fn request_shutdown(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        let tripped = self.shutdown.request(reason.as_str());
        if tripped {
            debug!("client {} shutting down: {}", self.client_id, reason);
        }
        tripped
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_requested()
    }

    /// The reason given by the request that shut the client down.
    #[must_use]
    pub fn shutdown_reason(&self) -> Option<String> {
        self.shutdown.reason().map(ToOwned::to_owned)
    }

    /// Whether the sender loop has stopped and the queue no longer accepts messages.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Waits until the sender loop has stopped.
    pub async fn closed(&self) {
        self.queue.closed().await;
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("client_id", &self.client_id)
            .field("uri", &self.request.uri)
            .field("capacity", &self.capacity)
            .field("shutdown", &self.shutdown.reason())
            .finish()
    }
}

/// How a client finished, returned by [`Client::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientExit {
    /// The finished client.
    pub client_id: ClientId,

    /// Reason recorded by the shutdown request, if any.
    pub reason: Option<String>,
}
