//! Board-agnostic logic for the mesh bridge node
//!
//! This crate contains everything the node does that does not depend on a
//! specific chip or mesh stack:
//!
//! - Slave serial link (receive queue, frame parsing, command output)
//! - Mesh node behaviour (greeting, heartbeat, network status)
//! - Status LED blinking
//! - Node configuration and its persistence
//! - The bridge control loop joining them
//!
//! Hardware is reached only through the traits in `meshbridge-hal`.

#![no_std]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod indicator;
pub mod link;
pub mod mesh;
pub mod timer;

pub use bridge::{Bridge, RequestRelay, SlaveRequest};
pub use config::{ConfigError, NodeConfig};
