//! Mesh network node
//!
//! [`MeshNode`] wraps a [`MeshTransport`] with the node's own behaviour:
//! greeting new peers, the optional heartbeat broadcast, and network
//! status reporting. Application logic plugs in through [`MeshHandler`],
//! which is passed to every [`MeshNode::update`] call.

pub mod status;

use meshbridge_hal::{MeshConfig, MeshEvent, MeshTransport, NodeId};

use crate::timer::Timer;

pub use status::{heartbeat_message, welcome_message, NetworkStatus, SignalQuality};

/// Receiver for mesh events
///
/// Every method defaults to doing nothing.
pub trait MeshHandler {
    /// A message arrived from `from`
    fn on_receive(&mut self, from: NodeId, payload: &[u8]) {
        let _ = (from, payload);
    }

    /// A peer connected directly to this node (already greeted)
    fn on_new_connection(&mut self, node: NodeId) {
        let _ = node;
    }

    /// The mesh topology changed
    fn on_changed_connections(&mut self, status: &NetworkStatus) {
        let _ = status;
    }

    /// A directly connected peer went away
    fn on_dropped_connection(&mut self, node: NodeId) {
        let _ = node;
    }
}

impl MeshHandler for () {}

/// Mesh node with periodic housekeeping
pub struct MeshNode<M> {
    transport: M,
    heartbeat: Option<Timer>,
    status_check: Option<Timer>,
    heartbeats_sent: u32,
}

impl<M: MeshTransport> MeshNode<M> {
    /// Create a node with no heartbeat and no periodic status check
    pub fn new(transport: M) -> Self {
        Self {
            transport,
            heartbeat: None,
            status_check: None,
            heartbeats_sent: 0,
        }
    }

    /// Broadcast a heartbeat every `interval_ms`
    pub fn with_heartbeat(mut self, interval_ms: Option<u32>) -> Self {
        self.heartbeat = interval_ms.map(Timer::new);
        self
    }

    /// Log the network status every `interval_ms`
    pub fn with_status_check(mut self, interval_ms: Option<u32>) -> Self {
        self.status_check = interval_ms.map(Timer::new);
        self
    }

    /// Join the mesh and start the periodic timers
    pub fn begin(&mut self, config: &MeshConfig<'_>, now_ms: u32) {
        self.transport.init(config);
        for timer in [&mut self.heartbeat, &mut self.status_check]
            .into_iter()
            .flatten()
        {
            timer.start(now_ms);
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Mesh node {} joining '{}' on port {}",
            self.transport.node_id(),
            config.prefix,
            config.port
        );
    }

    /// Run one mesh cycle
    ///
    /// Lets the transport do its housekeeping, dispatches every pending
    /// event to `handler`, and fires the due periodic tasks. Returns the
    /// number of events handled.
    pub fn update<H: MeshHandler + ?Sized>(&mut self, now_ms: u32, handler: &mut H) -> usize {
        self.transport.update();

        let mut handled = 0;
        while let Some(event) = self.transport.poll_event() {
            self.dispatch(event, handler);
            handled += 1;
        }

        if let Some(timer) = self.heartbeat.as_mut() {
            if timer.is_timeout(now_ms) {
                timer.start(now_ms);
                self.send_heartbeat(now_ms);
            }
        }

        if let Some(timer) = self.status_check.as_mut() {
            if timer.is_timeout(now_ms) {
                timer.start(now_ms);
                self.log_status();
            }
        }

        handled
    }

    fn dispatch<H: MeshHandler + ?Sized>(&mut self, event: MeshEvent, handler: &mut H) {
        match event {
            MeshEvent::Received { from, payload } => {
                #[cfg(feature = "defmt")]
                defmt::trace!("Mesh RX from {}: {} bytes", from, payload.len());
                handler.on_receive(from, &payload);
            }
            MeshEvent::NewConnection(node) => {
                #[cfg(feature = "defmt")]
                defmt::info!("New connection: {}", node);
                let welcome = welcome_message(self.transport.node_id());
                if !self.transport.send_single(node, welcome.as_bytes()) {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Welcome to {} not queued", node);
                }
                handler.on_new_connection(node);
            }
            MeshEvent::ChangedConnections => {
                let status = self.log_status();
                handler.on_changed_connections(&status);
            }
            MeshEvent::DroppedConnection(node) => {
                #[cfg(feature = "defmt")]
                defmt::info!("Dropped connection: {}", node);
                handler.on_dropped_connection(node);
            }
        }
    }

    /// Broadcast `HEARTBEAT_<id>_<uptime s>` now
    pub fn send_heartbeat(&mut self, now_ms: u32) -> bool {
        let text = heartbeat_message(self.transport.node_id(), now_ms);
        let queued = self.transport.send_broadcast(text.as_bytes());
        if queued {
            self.heartbeats_sent = self.heartbeats_sent.wrapping_add(1);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Heartbeat {=str} queued: {}", text.as_str(), queued);

        queued
    }

    fn log_status(&self) -> NetworkStatus {
        let status = self.network_status();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Network: {} nodes, RSSI {} dBm ({=str}), peers {}",
            status.node_count(),
            status.rssi,
            status.quality().label(),
            status.peers
        );

        status
    }

    /// Current view of the mesh
    pub fn network_status(&self) -> NetworkStatus {
        NetworkStatus {
            peers: self.transport.node_list(),
            rssi: self.transport.rssi(),
        }
    }

    /// Check if at least one peer is reachable
    pub fn is_connected(&self) -> bool {
        !self.transport.node_list().is_empty()
    }

    /// This node's identifier
    pub fn node_id(&self) -> NodeId {
        self.transport.node_id()
    }

    /// Send `payload` to every node
    pub fn broadcast(&mut self, payload: &[u8]) -> bool {
        self.transport.send_broadcast(payload)
    }

    /// Send `payload` to one node
    pub fn send_to(&mut self, node: NodeId, payload: &[u8]) -> bool {
        self.transport.send_single(node, payload)
    }

    /// Heartbeats successfully queued since creation
    pub fn heartbeats_sent(&self) -> u32 {
        self.heartbeats_sent
    }

    /// Get access to the transport
    pub fn transport(&self) -> &M {
        &self.transport
    }

    /// Get mutable access to the transport
    pub fn transport_mut(&mut self) -> &mut M {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::{Deque, Vec};
    use meshbridge_hal::{NodeList, Payload};

    #[derive(Default)]
    struct MockMesh {
        id: NodeId,
        peers: NodeList,
        rssi: i8,
        events: Deque<MeshEvent, 8>,
        broadcasts: Vec<Vec<u8, 64>, 8>,
        unicasts: Vec<(NodeId, Vec<u8, 64>), 8>,
        initialized: bool,
        updates: u32,
    }

    impl MeshTransport for MockMesh {
        fn init(&mut self, _config: &MeshConfig<'_>) {
            self.initialized = true;
        }

        fn update(&mut self) {
            self.updates += 1;
        }

        fn poll_event(&mut self) -> Option<MeshEvent> {
            self.events.pop_front()
        }

        fn send_broadcast(&mut self, payload: &[u8]) -> bool {
            self.broadcasts
                .push(Vec::from_slice(payload).unwrap())
                .is_ok()
        }

        fn send_single(&mut self, node: NodeId, payload: &[u8]) -> bool {
            self.unicasts
                .push((node, Vec::from_slice(payload).unwrap()))
                .is_ok()
        }

        fn node_id(&self) -> NodeId {
            self.id
        }

        fn node_list(&self) -> NodeList {
            self.peers.clone()
        }

        fn rssi(&self) -> i8 {
            self.rssi
        }
    }

    #[derive(Default)]
    struct Recorder {
        received: Vec<(NodeId, usize), 8>,
        connected: Vec<NodeId, 8>,
        dropped: Vec<NodeId, 8>,
        node_counts: Vec<usize, 8>,
    }

    impl MeshHandler for Recorder {
        fn on_receive(&mut self, from: NodeId, payload: &[u8]) {
            self.received.push((from, payload.len())).unwrap();
        }

        fn on_new_connection(&mut self, node: NodeId) {
            self.connected.push(node).unwrap();
        }

        fn on_changed_connections(&mut self, status: &NetworkStatus) {
            self.node_counts.push(status.node_count()).unwrap();
        }

        fn on_dropped_connection(&mut self, node: NodeId) {
            self.dropped.push(node).unwrap();
        }
    }

    const CONFIG: MeshConfig<'static> = MeshConfig {
        prefix: "MyMeshNet",
        password: "myPassword",
        port: 5555,
    };

    fn node(id: NodeId) -> MeshNode<MockMesh> {
        MeshNode::new(MockMesh {
            id,
            rssi: -55,
            ..Default::default()
        })
    }

    #[test]
    fn test_begin_initializes_transport() {
        let mut node = node(1);
        node.begin(&CONFIG, 0);
        assert!(node.transport().initialized);
    }

    #[test]
    fn test_new_connection_gets_welcome() {
        let mut node = node(1001);
        node.begin(&CONFIG, 0);
        node.transport_mut()
            .events
            .push_back(MeshEvent::NewConnection(2002))
            .unwrap();

        let mut recorder = Recorder::default();
        assert_eq!(node.update(10, &mut recorder), 1);

        let (to, text) = &node.transport().unicasts[0];
        assert_eq!(*to, 2002);
        assert_eq!(&text[..], b"WELCOME_1001");
        assert_eq!(&recorder.connected[..], &[2002]);
    }

    #[test]
    fn test_events_dispatch_in_order() {
        let mut node = node(1);
        node.transport_mut().peers.push(5).unwrap();
        {
            let events = &mut node.transport_mut().events;
            events
                .push_back(MeshEvent::Received {
                    from: 5,
                    payload: Payload::from_slice(&[0u8; 13]).unwrap(),
                })
                .unwrap();
            events.push_back(MeshEvent::ChangedConnections).unwrap();
            events.push_back(MeshEvent::DroppedConnection(5)).unwrap();
        }

        let mut recorder = Recorder::default();
        assert_eq!(node.update(0, &mut recorder), 3);
        assert_eq!(&recorder.received[..], &[(5, 13)]);
        assert_eq!(&recorder.node_counts[..], &[2]);
        assert_eq!(&recorder.dropped[..], &[5]);
        assert_eq!(node.transport().updates, 1);
    }

    #[test]
    fn test_unit_handler_ignores_events() {
        let mut node = node(1);
        node.transport_mut()
            .events
            .push_back(MeshEvent::NewConnection(9))
            .unwrap();
        assert_eq!(node.update(0, &mut ()), 1);
        // Greeting is the node's own behaviour, not the handler's
        assert_eq!(node.transport().unicasts.len(), 1);
    }

    #[test]
    fn test_heartbeat_interval() {
        let mut node = node(77).with_heartbeat(Some(3000));
        node.begin(&CONFIG, 1000);

        node.update(3999, &mut ());
        assert!(node.transport().broadcasts.is_empty());

        node.update(4000, &mut ());
        assert_eq!(&node.transport().broadcasts[0][..], b"HEARTBEAT_77_4");

        node.update(6999, &mut ());
        assert_eq!(node.transport().broadcasts.len(), 1);
        node.update(7000, &mut ());
        assert_eq!(node.heartbeats_sent(), 2);
    }

    #[test]
    fn test_no_heartbeat_by_default() {
        let mut node = node(77);
        node.begin(&CONFIG, 0);
        node.update(1_000_000, &mut ());
        assert!(node.transport().broadcasts.is_empty());
    }

    #[test]
    fn test_network_status() {
        let mut node = node(1);
        assert!(!node.is_connected());
        node.transport_mut().peers.push(2).unwrap();
        node.transport_mut().peers.push(3).unwrap();

        let status = node.network_status();
        assert!(node.is_connected());
        assert_eq!(status.node_count(), 3);
        assert_eq!(status.quality(), SignalQuality::Good);
    }
}
