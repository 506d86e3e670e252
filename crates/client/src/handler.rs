use async_trait::async_trait;

/// Callback invoked once per inbound text frame.
///
/// The receiver loop awaits `handle` before reading the next frame, so a slow
/// handler slows down reads from the peer.
#[async_trait]
pub trait FrameHandler: Send + 'static {
    /// Handles one text frame.
    async fn handle(&mut self, text: String);
}

#[async_trait]
impl<F> FrameHandler for F
where
    F: FnMut(String) + Send + 'static,
{
    async fn handle(&mut self, text: String) {
        self(text);
    }
}
