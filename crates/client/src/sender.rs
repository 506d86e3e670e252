use tokio::sync::mpsc;
use tracing::debug;
use wshub_connection::{Frame, FrameWriter};

use crate::hub::HubRef;
use crate::shutdown::Shutdown;
use crate::{ClientId, Error, Message, MessageFilter, Result};

/// Outbound half of a client: drains the queue and writes to the connection.
pub struct SenderLoop<W> {
    client_id: ClientId,
    writer: W,
    queue: mpsc::Receiver<Message>,
    shutdown: Shutdown,
    hub: HubRef,
}

impl<W: FrameWriter> SenderLoop<W> {
    pub(crate) const fn new(
        client_id: ClientId,
        writer: W,
        queue: mpsc::Receiver<Message>,
        shutdown: Shutdown,
        hub: HubRef,
    ) -> Self {
        Self {
            client_id,
            writer,
            queue,
            shutdown,
            hub,
        }
    }

    /// Runs until shutdown is requested or every handle to the client is gone.
    ///
    /// Messages are written in the order they were queued. A message the
    /// filter drops is skipped silently; a failed write goes to the hub and
    /// the loop moves on to the next message.
    pub async fn run<M: MessageFilter>(mut self, mut filter: M) {
        debug!("client {} sender started", self.client_id);

        loop {
            let message = tokio::select! {
                biased;
                () = self.shutdown.requested() => {
                    debug!("client {} sender observed shutdown", self.client_id);
                    break;
                }
                message = self.queue.recv() => {
                    if let Some(message) = message {
                        message
                    } else {
                        debug!("client {} outbound queue closed", self.client_id);
                        self.shutdown.request("outbound queue closed");
                        break;
                    }
                }
            };

            let message = match filter.filter(message) {
                Ok(Some(message)) => message,
                Ok(None) => {
                    debug!("client {} filter dropped a message", self.client_id);
                    continue;
                }
                Err(e) => {
                    debug!("client {} filter rejected a message: {}", self.client_id, e);
                    continue;
                }
            };

            if let Err(error) = self.dispatch(message).await {
                self.hub.report(error);
            }
        }

        // Later sends fail instead of piling up
        self.queue.close();

        if let Err(e) = self.writer.close().await {
            debug!("client {} failed to close writer: {}", self.client_id, e);
        }

        debug!("client {} sender stopped", self.client_id);
    }

    async fn dispatch(&mut self, message: Message) -> Result<()> {
        let client_id = self.client_id;

        let written = match message {
            Message::Raw(raw) => self.writer.write_raw(raw).await,
            Message::Structured(value) => {
                let text = serde_json::to_string(&value)
                    .map_err(|source| Error::Encode { client_id, source })?;
                self.writer.write_frame(Frame::Text(text)).await
            }
        };

        written.map_err(|source| Error::Write { client_id, source })
    }
}

impl<W> std::fmt::Debug for SenderLoop<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderLoop")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
