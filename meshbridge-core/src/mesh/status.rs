//! Network status report and mesh message texts

use core::fmt::Write;

use heapless::String;
use meshbridge_hal::{NodeId, NodeList};

/// Longest text message the node composes
pub const MAX_TEXT_LEN: usize = 48;

/// Composed text message
pub type Text = String<MAX_TEXT_LEN>;

/// Coarse RSSI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalQuality {
    /// -50 dBm or better
    Excellent,
    /// -60 dBm or better
    Good,
    /// -70 dBm or better
    Fair,
    /// Below -70 dBm
    Poor,
}

impl SignalQuality {
    /// Classify a received signal strength
    pub fn from_rssi(rssi: i8) -> Self {
        match rssi {
            r if r >= -50 => SignalQuality::Excellent,
            r if r >= -60 => SignalQuality::Good,
            r if r >= -70 => SignalQuality::Fair,
            _ => SignalQuality::Poor,
        }
    }

    /// Short human-readable label
    pub fn label(self) -> &'static str {
        match self {
            SignalQuality::Excellent => "excellent",
            SignalQuality::Good => "good",
            SignalQuality::Fair => "fair",
            SignalQuality::Poor => "poor",
        }
    }
}

/// Snapshot of the mesh as seen from this node
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkStatus {
    /// Reachable peers, excluding this node
    pub peers: NodeList,
    /// Uplink signal strength in dBm
    pub rssi: i8,
}

impl NetworkStatus {
    /// Nodes in the mesh including this one
    pub fn node_count(&self) -> usize {
        self.peers.len() + 1
    }

    /// Check if any peer is reachable
    pub fn is_connected(&self) -> bool {
        !self.peers.is_empty()
    }

    /// Uplink signal classification
    pub fn quality(&self) -> SignalQuality {
        SignalQuality::from_rssi(self.rssi)
    }
}

/// `WELCOME_<node id>`, unicast to a newly connected peer
pub fn welcome_message(own_id: NodeId) -> Text {
    let mut text = Text::new();
    // 8 + 10 digits always fits
    let _ = write!(text, "WELCOME_{}", own_id);
    text
}

/// `HEARTBEAT_<node id>_<uptime seconds>`, broadcast periodically
pub fn heartbeat_message(own_id: NodeId, now_ms: u32) -> Text {
    let mut text = Text::new();
    let _ = write!(text, "HEARTBEAT_{}_{}", own_id, now_ms / 1000);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_quality_thresholds() {
        assert_eq!(SignalQuality::from_rssi(-30), SignalQuality::Excellent);
        assert_eq!(SignalQuality::from_rssi(-50), SignalQuality::Excellent);
        assert_eq!(SignalQuality::from_rssi(-51), SignalQuality::Good);
        assert_eq!(SignalQuality::from_rssi(-60), SignalQuality::Good);
        assert_eq!(SignalQuality::from_rssi(-70), SignalQuality::Fair);
        assert_eq!(SignalQuality::from_rssi(-71), SignalQuality::Poor);
        assert_eq!(SignalQuality::from_rssi(i8::MIN), SignalQuality::Poor);
    }

    #[test]
    fn test_node_count_includes_self() {
        let mut peers = NodeList::new();
        let status = NetworkStatus { peers: peers.clone(), rssi: -40 };
        assert_eq!(status.node_count(), 1);
        assert!(!status.is_connected());

        peers.push(7).unwrap();
        peers.push(9).unwrap();
        let status = NetworkStatus { peers, rssi: -65 };
        assert_eq!(status.node_count(), 3);
        assert!(status.is_connected());
        assert_eq!(status.quality(), SignalQuality::Fair);
    }

    #[test]
    fn test_welcome_message() {
        assert_eq!(welcome_message(123456).as_str(), "WELCOME_123456");
        assert_eq!(welcome_message(u32::MAX).as_str(), "WELCOME_4294967295");
    }

    #[test]
    fn test_heartbeat_message() {
        assert_eq!(heartbeat_message(42, 12_999).as_str(), "HEARTBEAT_42_12");
        assert_eq!(
            heartbeat_message(u32::MAX, u32::MAX).as_str(),
            "HEARTBEAT_4294967295_4294967"
        );
    }
}
