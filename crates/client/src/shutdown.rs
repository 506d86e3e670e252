use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Set-once shutdown signal shared by a client's loops and handles.
///
/// The first request records its reason and trips the signal. Later requests
/// find it already pending and are dropped.
#[derive(Clone, Debug, Default)]
pub(crate) struct Shutdown {
    token: CancellationToken,
    reason: Arc<OnceLock<String>>,
}

impl Shutdown {
    /// Requests shutdown. Returns `true` if this call tripped the signal.
    pub(crate) fn request(&self, reason: impl Into<String>) -> bool {
        if self.reason.set(reason.into()).is_err() {
            return false;
        }

        self.token.cancel();
        true
    }

    /// Whether shutdown has been requested, without waiting.
    pub(crate) fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason recorded by the request that tripped the signal.
    pub(crate) fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }

    /// Waits until shutdown is requested.
    pub(crate) async fn requested(&self) {
        self.token.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_first_request_wins() {
        let shutdown = Shutdown::default();
        assert!(!shutdown.is_requested());
        assert_eq!(shutdown.reason(), None);

        assert!(shutdown.request("client closed"));
        assert!(!shutdown.request("sender stopping"));

        assert!(shutdown.is_requested());
        assert_eq!(shutdown.reason(), Some("client closed"));
    }

    #[test]
    fn test_clones_share_the_signal() {
        let shutdown = Shutdown::default();
        let other = shutdown.clone();

        assert!(other.request("hub closing"));
        assert!(shutdown.is_requested());
        assert!(!shutdown.request("again"));
    }

    #[tokio::test]
    async fn test_requested_wakes_waiters() {
        let shutdown = Shutdown::default();
        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.requested().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        shutdown.request("test");
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter was not woken")
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_requests_trip_once() {
        let shutdown = Shutdown::default();

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let shutdown = shutdown.clone();
                tokio::spawn(async move { shutdown.request(format!("caller {i}")) })
            })
            .collect();

        let mut tripped = 0;
        for task in tasks {
            if task.await.unwrap() {
                tripped += 1;
            }
        }

        assert_eq!(tripped, 1);
        assert!(shutdown.reason().unwrap().starts_with("caller "));
    }
}
