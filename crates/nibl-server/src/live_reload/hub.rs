//! Reload hub.
//!
//! Membership registry for connected live reload clients. One hub is
//! created per server and shared by handle between the websocket handler
//! (register/unregister) and the rebuild scheduler (broadcast).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use tokio::sync::Mutex;
use uuid::Uuid;

/// Identity of a registered client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Write half of a client connection.
pub trait ReloadSink: Send + 'static {
    type Error: fmt::Display + Send;

    /// Send a text payload to the client.
    fn deliver(&mut self, payload: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Close the connection. Errors are ignored.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Broadcast registry of reload clients.
pub struct Hub<S> {
    clients: Mutex<HashMap<ClientId, S>>,
}

impl<S: ReloadSink> Default for Hub<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ReloadSink> Hub<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Add a client. Every call adds a new member.
    pub async fn register(&self, sink: S) -> ClientId {
        let id = ClientId::new();
        self.clients.lock().await.insert(id, sink);
        tracing::debug!(client = %id, "Live reload client registered");
        id
    }

    /// Remove a client and close its connection. No-op for unknown ids.
    pub async fn unregister(&self, id: ClientId) {
        let mut clients = self.clients.lock().await;
        if let Some(mut sink) = clients.remove(&id) {
            sink.close().await;
            tracing::debug!(client = %id, "Live reload client unregistered");
        }
    }

    /// Send `payload` to every client, one at a time.
    ///
    /// Clients whose send fails are closed and dropped in the same pass.
    ///
    /// # Returns
    ///
    /// The number of clients that received the payload.
    pub async fn broadcast(&self, payload: &str) -> usize {
        let mut clients = self.clients.lock().await;
        let mut failed = Vec::new();
        let mut delivered = 0;

        for (id, sink) in clients.iter_mut() {
            match sink.deliver(payload).await {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::debug!(client = %id, error = %err, "Dropping live reload client");
                    failed.push(*id);
                }
            }
        }

        for id in failed {
            if let Some(mut sink) = clients.remove(&id) {
                sink.close().await;
            }
        }

        delivered
    }

    /// Number of registered clients.
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::ReloadSink;

    /// In-memory sink recording what it receives.
    #[derive(Clone, Default)]
    pub(crate) struct MemorySink {
        received: Arc<Mutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
        broken: bool,
    }

    impl MemorySink {
        pub(crate) fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        pub(crate) fn received(&self) -> Vec<String> {
            self.received.lock().unwrap().clone()
        }

        pub(crate) fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    impl ReloadSink for MemorySink {
        type Error = std::io::Error;

        async fn deliver(&mut self, payload: &str) -> Result<(), Self::Error> {
            if self.broken {
                return Err(std::io::ErrorKind::BrokenPipe.into());
            }
            self.received.lock().unwrap().push(payload.to_owned());
            Ok(())
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemorySink;
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_broadcast_reaches_every_client_once() {
        let hub = Hub::new();
        let a = MemorySink::default();
        let b = MemorySink::default();
        hub.register(a.clone()).await;
        hub.register(b.clone()).await;

        let delivered = hub.broadcast("reload").await;

        assert_eq!(delivered, 2);
        assert_eq!(a.received(), vec!["reload"]);
        assert_eq!(b.received(), vec!["reload"]);
    }

    #[tokio::test]
    async fn test_register_same_sink_twice_adds_two_members() {
        let hub = Hub::new();
        let sink = MemorySink::default();
        hub.register(sink.clone()).await;
        hub.register(sink.clone()).await;

        assert_eq!(hub.len().await, 2);
        assert_eq!(hub.broadcast("reload").await, 2);
        assert_eq!(sink.received().len(), 2);
    }

    #[tokio::test]
    async fn test_broken_client_removed_during_broadcast() {
        let hub = Hub::new();
        let healthy = MemorySink::default();
        let broken = MemorySink::broken();
        hub.register(healthy.clone()).await;
        hub.register(broken.clone()).await;

        let delivered = hub.broadcast("reload").await;

        assert_eq!(delivered, 1);
        assert_eq!(hub.len().await, 1);
        assert!(broken.received().is_empty());
        assert!(broken.is_closed());
        assert!(!healthy.is_closed());
    }

    #[tokio::test]
    async fn test_unregister_closes_and_is_idempotent() {
        let hub = Hub::new();
        let sink = MemorySink::default();
        let id = hub.register(sink.clone()).await;

        hub.unregister(id).await;
        hub.unregister(id).await;

        assert!(hub.is_empty().await);
        assert!(sink.is_closed());
        assert_eq!(hub.broadcast("reload").await, 0);
        assert!(sink.received().is_empty());
    }

    #[tokio::test]
    async fn test_client_registered_after_broadcast_gets_nothing() {
        let hub = Hub::new();
        hub.broadcast("reload").await;

        let late = MemorySink::default();
        hub.register(late.clone()).await;

        assert!(late.received().is_empty());
    }

    #[tokio::test]
    async fn test_hubs_are_independent() {
        let first = Hub::new();
        let second: Hub<MemorySink> = Hub::new();
        first.register(MemorySink::default()).await;

        assert_eq!(first.len().await, 1);
        assert!(second.is_empty().await);
    }
}
