//! Mesh network abstractions
//!
//! The mesh stack (topology maintenance, routing, delivery) lives outside
//! this workspace. The node only needs to send messages, learn who is
//! reachable, and be told about incoming messages and topology changes.
//!
//! Events are pulled with [`MeshTransport::poll_event`] from the control
//! loop instead of being pushed through static callbacks, so handlers can
//! borrow application state directly.

use heapless::Vec;

/// Maximum mesh payload the node handles, in bytes
pub const MAX_MESSAGE_LEN: usize = 64;

/// Maximum number of peers tracked in a node list
pub const MAX_NODES: usize = 16;

/// Mesh node identifier
pub type NodeId = u32;

/// Bounded list of reachable peers (excluding this node)
pub type NodeList = Vec<NodeId, MAX_NODES>;

/// Bounded mesh message payload
pub type Payload = Vec<u8, MAX_MESSAGE_LEN>;

/// Mesh join parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeshConfig<'a> {
    /// Network name (SSID prefix)
    pub prefix: &'a str,
    /// Network password
    pub password: &'a str,
    /// Mesh TCP port
    pub port: u16,
}

/// Events reported by the mesh stack
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeshEvent {
    /// A message addressed to this node (or broadcast) arrived
    Received { from: NodeId, payload: Payload },
    /// A peer connected directly to this node
    NewConnection(NodeId),
    /// The mesh topology changed somewhere
    ChangedConnections,
    /// A directly connected peer went away
    DroppedConnection(NodeId),
}

/// Mesh network transport
pub trait MeshTransport {
    /// Join (or form) the mesh
    fn init(&mut self, config: &MeshConfig<'_>);

    /// Run the mesh stack's housekeeping; call once per control cycle
    fn update(&mut self);

    /// Take the next pending event, if any
    fn poll_event(&mut self) -> Option<MeshEvent>;

    /// Send `payload` to every node; returns false if it was not queued
    fn send_broadcast(&mut self, payload: &[u8]) -> bool;

    /// Send `payload` to a single node; returns false if it was not queued
    fn send_single(&mut self, node: NodeId, payload: &[u8]) -> bool;

    /// This node's identifier
    fn node_id(&self) -> NodeId;

    /// Currently reachable peers, excluding this node
    fn node_list(&self) -> NodeList;

    /// Received signal strength of the uplink in dBm
    fn rssi(&self) -> i8;
}
