/// Number of outbound messages a client holds before `send` fails.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Configuration for a [`Client`](crate::Client).
#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// Capacity of the outbound queue. Values below one are raised to one.
    pub queue_capacity: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
