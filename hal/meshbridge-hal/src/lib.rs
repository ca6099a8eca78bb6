//! Meshbridge Hardware Abstraction Layer
//!
//! This crate defines the traits the bridge node is written against. A
//! board support package implements them for a concrete chip and mesh
//! stack; host tests implement them with in-memory mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  meshbridge-core (bridge control loop)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  meshbridge-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  board UART,  │       │   mesh stack  │
//! │  LED, flash   │       │    binding    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Slave serial line
//! - [`gpio::OutputPin`] - Status LED
//! - [`clock::Clock`] - Millisecond uptime
//! - [`mesh::MeshTransport`] - Mesh network
//! - [`flash::FlashStorage`] - Persistent storage

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod flash;
pub mod gpio;
pub mod mesh;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::OutputPin;
pub use mesh::{MeshConfig, MeshEvent, MeshTransport, NodeId, NodeList, Payload};
pub use uart::{UartConfig, UartRx, UartTx};
