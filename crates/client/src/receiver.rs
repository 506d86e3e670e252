use tracing::debug;
use wshub_connection::FrameReader;

use crate::hub::HubRef;
use crate::shutdown::Shutdown;
use crate::{ClientId, Error, FrameHandler};

/// Inbound half of a client: reads text frames and hands them to a handler.
pub struct ReceiverLoop<R> {
    client_id: ClientId,
    reader: R,
    shutdown: Shutdown,
    hub: HubRef,
}

impl<R: FrameReader> ReceiverLoop<R> {
    pub(crate) const fn new(client_id: ClientId, reader: R, shutdown: Shutdown, hub: HubRef) -> Self {
        Self {
            client_id,
            reader,
            shutdown,
            hub,
        }
    }

    /// Runs until shutdown is requested or the peer ends the stream.
    ///
    /// A pending read is abandoned as soon as shutdown is requested. Read
    /// errors other than end of stream go to the hub and the loop keeps
    /// reading.
    pub async fn run<H: FrameHandler>(mut self, mut handler: H) {
        debug!("client {} receiver started", self.client_id);

        loop {
            let result = tokio::select! {
                biased;
                () = self.shutdown.requested() => {
                    debug!("client {} receiver observed shutdown", self.client_id);
                    break;
                }
                result = self.reader.read_text() => result,
            };

            match result {
                Ok(text) => handler.handle(text).await,
                Err(e) if e.is_closed() => {
                    debug!("client {} closed the connection", self.client_id);
                    self.shutdown.request("client closed");
                    break;
                }
                Err(source) => self.hub.report(Error::Read {
                    client_id: self.client_id,
                    source,
                }),
            }
        }

        debug!("client {} receiver stopped", self.client_id);
    }
}

impl<R> std::fmt::Debug for ReceiverLoop<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverLoop")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
