//! Routed event relay.
//!
//! Producers push `(text, route)` pairs into per-stream queues through a [`RelaySink`].
//! Each queue has its own drain task that republishes events, in enqueue order, on the
//! [`Transport`]. The transport hands each event to the one subscription registered for
//! its route and drops events for unknown routes. Nothing is acknowledged or retried.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use shared::{ws_types, RouteKey};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

/// Named outward stream an event is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Server,
    Wire,
    Client,
}

impl LogStream {
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Server => ws_types::SERVER_LOG,
            Self::Wire => ws_types::WIRE_LOG,
            Self::Client => ws_types::CLIENT_LOG,
        }
    }
}

/// One queued line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEvent {
    pub text: String,
    pub route: RouteKey,
}

/// Event as delivered to a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub stream: LogStream,
    pub route: RouteKey,
    pub text: String,
}

struct Route {
    owner: u64,
    tx: mpsc::Sender<Published>,
}

struct RouteTable {
    capacity: usize,
    next_owner: AtomicU64,
    routes: Mutex<HashMap<RouteKey, Route>>,
}

/// Outward delivery: route key → the subscription that owns it.
///
/// Each subscription has its own bounded queue, so a slow or flooded viewer only ever
/// loses its own events.
#[derive(Clone)]
pub struct Transport {
    table: Arc<RouteTable>,
}

impl Transport {
    /// `capacity` bounds each subscription's queue.
    pub fn new(capacity: usize) -> Self {
        Self {
            table: Arc::new(RouteTable {
                capacity: capacity.max(1),
                next_owner: AtomicU64::new(1),
                routes: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a subscription for `route`. A later subscription for the same route
    /// takes it over.
    pub fn subscribe(&self, route: RouteKey) -> Subscription {
        let (tx, rx) = mpsc::channel(self.table.capacity);
        let mut subscription = Subscription {
            owner: self.table.next_owner.fetch_add(1, Ordering::Relaxed),
            tx,
            rx,
            routes: Vec::new(),
            transport: self.clone(),
        };
        subscription.add_route(route);
        subscription
    }

    /// Deliver to the route's subscription. Unknown routes and full queues drop the event.
    pub fn publish(&self, stream: LogStream, route: RouteKey, text: impl Into<String>) {
        let Some(tx) = self.routes().get(&route).map(|r| r.tx.clone()) else {
            return;
        };
        let event = Published {
            stream,
            route,
            text: text.into(),
        };
        if let Err(TrySendError::Full(event)) = tx.try_send(event) {
            tracing::debug!(route = %event.route, "subscriber lagging, event dropped");
        }
    }

    #[cfg(test)]
    pub(crate) fn has_route(&self, route: &RouteKey) -> bool {
        self.routes().contains_key(route)
    }

    fn routes(&self) -> MutexGuard<'_, HashMap<RouteKey, Route>> {
        self.table
            .routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Receiving end for one viewer. Its routes are released when it is dropped.
pub struct Subscription {
    owner: u64,
    tx: mpsc::Sender<Published>,
    rx: mpsc::Receiver<Published>,
    routes: Vec<RouteKey>,
    transport: Transport,
}

impl Subscription {
    /// Also receive events published for `route`.
    pub fn add_route(&mut self, route: RouteKey) {
        self.transport.routes().insert(
            route.clone(),
            Route {
                owner: self.owner,
                tx: self.tx.clone(),
            },
        );
        self.routes.push(route);
    }

    pub async fn recv(&mut self) -> Option<Published> {
        self.rx.recv().await
    }

    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Option<Published> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut routes = self.transport.routes();
        for route in &self.routes {
            if routes.get(route).is_some_and(|r| r.owner == self.owner) {
                routes.remove(route);
            }
        }
    }
}

/// Producer handle for one relay queue. Cheap to clone, never blocks.
#[derive(Clone)]
pub struct RelaySink {
    tx: mpsc::UnboundedSender<RelayEvent>,
}

impl RelaySink {
    pub fn enqueue(&self, text: impl Into<String>, route: RouteKey) {
        let event = RelayEvent {
            text: text.into(),
            route,
        };
        if self.tx.send(event).is_err() {
            tracing::debug!("relay drain stopped, event dropped");
        }
    }
}

/// The server-log and wire-log queues with their drain tasks.
pub struct EventRelay {
    server: RelaySink,
    wire: RelaySink,
    drains: Vec<JoinHandle<()>>,
}

impl EventRelay {
    /// Create both queues and spawn their drain tasks onto the current runtime.
    pub fn start(transport: Transport) -> Self {
        let (server, server_drain) = queue(LogStream::Server, transport.clone());
        let (wire, wire_drain) = queue(LogStream::Wire, transport);
        Self {
            server,
            wire,
            drains: vec![server_drain, wire_drain],
        }
    }

    /// Sink for game session lines, routed by viewer identity.
    pub fn server_sink(&self) -> RelaySink {
        self.server.clone()
    }

    /// Sink for capture trace lines, routed by observed TCP port.
    pub fn wire_sink(&self) -> RelaySink {
        self.wire.clone()
    }

    /// Stop draining. Events still queued are discarded.
    pub fn shutdown(self) {
        for drain in self.drains {
            drain.abort();
        }
    }
}

fn queue(stream: LogStream, transport: Transport) -> (RelaySink, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let drain = tokio::spawn(run_drain(stream, rx, transport));
    (RelaySink { tx }, drain)
}

async fn run_drain(
    stream: LogStream,
    mut rx: mpsc::UnboundedReceiver<RelayEvent>,
    transport: Transport,
) {
    while let Some(event) = rx.recv().await {
        transport.publish(stream, event.route, event.text);
    }
    tracing::debug!(event = stream.event_name(), "relay queue closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next(rx: &mut Subscription) -> Published {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("relay stalled")
            .expect("subscription closed")
    }

    #[tokio::test]
    async fn queue_preserves_fifo_order() {
        let transport = Transport::default();
        let mut rx = transport.subscribe(RouteKey::viewer("v1"));
        let relay = EventRelay::start(transport);
        let sink = relay.server_sink();

        for text in ["A", "B", "C"] {
            sink.enqueue(text, RouteKey::viewer("v1"));
        }

        for expected in ["A", "B", "C"] {
            let event = next(&mut rx).await;
            assert_eq!(event.text, expected);
            assert_eq!(event.stream, LogStream::Server);
            assert_eq!(event.route, RouteKey::viewer("v1"));
        }
    }

    #[tokio::test]
    async fn streams_keep_their_event_names_and_routes() {
        let transport = Transport::default();
        let mut rx = transport.subscribe(RouteKey::viewer("v2"));
        rx.add_route(RouteKey::Port(50123));
        let relay = EventRelay::start(transport);

        relay.wire_sink().enqueue("| 1 | trace", RouteKey::Port(50123));
        let event = next(&mut rx).await;
        assert_eq!(event.stream.event_name(), "wire_log");
        assert_eq!(event.route, RouteKey::Port(50123));

        relay.server_sink().enqueue("hello", RouteKey::viewer("v2"));
        let event = next(&mut rx).await;
        assert_eq!(event.stream.event_name(), "server_log");
        assert_eq!(event.route, RouteKey::viewer("v2"));
    }

    #[tokio::test]
    async fn wire_backlog_does_not_hold_back_server_events() {
        let transport = Transport::new(4096);
        let mut rx = transport.subscribe(RouteKey::Port(1));
        rx.add_route(RouteKey::viewer("v"));
        let relay = EventRelay::start(transport);

        let wire = relay.wire_sink();
        for i in 0..1000 {
            wire.enqueue(format!("trace {i}"), RouteKey::Port(1));
        }
        relay.server_sink().enqueue("session line", RouteKey::viewer("v"));

        let mut server_seen = false;
        let mut wire_order = Vec::new();
        while !server_seen || wire_order.len() < 1000 {
            let event = next(&mut rx).await;
            match event.stream {
                LogStream::Server => server_seen = true,
                _ => wire_order.push(event.text),
            }
        }
        let expected: Vec<String> = (0..1000).map(|i| format!("trace {i}")).collect();
        assert_eq!(wire_order, expected);
    }

    #[test]
    fn traffic_on_other_routes_never_crowds_out_a_viewer() {
        let transport = Transport::new(16);
        let mut a = transport.subscribe(RouteKey::viewer("a"));
        // b never drains its queue
        let _b = transport.subscribe(RouteKey::viewer("b"));

        transport.publish(LogStream::Client, RouteKey::viewer("a"), "Rolls Left: 2");
        for i in 0..300 {
            transport.publish(LogStream::Wire, RouteKey::Port(40000 + i), "trace");
            transport.publish(LogStream::Client, RouteKey::viewer("b"), "b output");
        }

        let own = a.try_recv().expect("viewer a lost its reply");
        assert_eq!(own.text, "Rolls Left: 2");
        assert_eq!(own.route, RouteKey::viewer("a"));
        assert!(a.try_recv().is_none());
    }

    #[test]
    fn full_queue_drops_only_the_overflow() {
        let transport = Transport::new(4);
        let mut rx = transport.subscribe(RouteKey::viewer("slow"));
        for i in 0..10 {
            transport.publish(LogStream::Server, RouteKey::viewer("slow"), format!("{i}"));
        }
        let kept: Vec<String> = std::iter::from_fn(|| rx.try_recv()).map(|e| e.text).collect();
        assert_eq!(kept, ["0", "1", "2", "3"]);
    }

    #[test]
    fn dropping_a_subscription_releases_its_routes() {
        let transport = Transport::default();
        let mut first = transport.subscribe(RouteKey::viewer("v"));
        first.add_route(RouteKey::Port(7));
        assert!(transport.has_route(&RouteKey::Port(7)));

        // a newer owner of the viewer route survives the old one being dropped
        let mut second = transport.subscribe(RouteKey::viewer("v"));
        drop(first);
        assert!(!transport.has_route(&RouteKey::Port(7)));
        assert!(transport.has_route(&RouteKey::viewer("v")));

        transport.publish(LogStream::Client, RouteKey::viewer("v"), "still here");
        assert_eq!(second.try_recv().map(|e| e.text).as_deref(), Some("still here"));
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_is_silent() {
        let relay = EventRelay::start(Transport::default());
        let sink = relay.server_sink();
        relay.shutdown();
        tokio::task::yield_now().await;
        sink.enqueue("late", RouteKey::viewer("gone"));
    }

    #[test]
    fn publish_to_unknown_route_is_dropped() {
        let transport = Transport::new(1);
        transport.publish(LogStream::Client, RouteKey::viewer("nobody"), "lost");
        let mut rx = transport.subscribe(RouteKey::viewer("nobody"));
        assert!(rx.try_recv().is_none());
    }
}
