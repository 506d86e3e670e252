use std::sync::{Arc, Weak};

use tracing::warn;

use crate::{ClientId, Error};

/// The hub a client belongs to.
///
/// Clients only hold a weak reference to their hub and use it for nothing but
/// reporting errors that do not stop their loops.
pub trait Hub: Send + Sync + 'static {
    /// Observes a non-fatal read or write error of one of the hub's clients.
    fn error_observer(&self, error: Error);
}

/// Weak back-reference from a client to its hub.
#[derive(Clone)]
pub(crate) struct HubRef {
    client_id: ClientId,
    hub: Weak<dyn Hub>,
}

impl HubRef {
    pub(crate) fn new<H: Hub>(client_id: ClientId, hub: &Arc<H>) -> Self {
        let hub: Weak<dyn Hub> = Arc::<H>::downgrade(hub);
        Self { client_id, hub }
    }

    /// Hands the error to the hub, or logs it once the hub is gone.
    pub(crate) fn report(&self, error: Error) {
        match self.hub.upgrade() {
            Some(hub) => hub.error_observer(error),
            None => warn!("client {} has no hub to observe: {}", self.client_id, error),
        }
    }
}
