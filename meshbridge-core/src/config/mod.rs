//! Node configuration
//!
//! Everything a deployed node may need to change without reflashing.
//! Defaults match the commissioned network; a stored copy (postcard
//! binary, see [`store`]) overrides them at boot.

#[cfg(feature = "serde")]
pub mod store;

use heapless::String;
use meshbridge_hal::flash::FlashError;
use meshbridge_hal::{MeshConfig, UartConfig};
use meshbridge_protocol::ResyncPolicy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
pub use store::{load_config, load_config_or_default, save_config, StoredConfig};

use crate::indicator::{BLINK_CONNECTED_MS, BLINK_DISCONNECTED_MS};

/// Maximum mesh prefix length
pub const MAX_PREFIX_LEN: usize = 32;

/// Maximum mesh password length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Default mesh network name
pub const DEFAULT_MESH_PREFIX: &str = "MyMeshNet";

/// Default mesh password
pub const DEFAULT_MESH_PASSWORD: &str = "myPassword";

/// Default mesh TCP port
pub const DEFAULT_MESH_PORT: u16 = 5555;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage operation failed
    Flash(FlashError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored data is not a node configuration
    BadMagic,
    /// Stored data was written by an incompatible version
    VersionMismatch,
    /// A string setting does not fit its buffer
    TooLong,
    /// A numeric setting is out of range
    InvalidValue,
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

/// Node configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Slave UART baud rate
    pub baudrate: u32,
    /// Mesh network name
    pub mesh_prefix: String<MAX_PREFIX_LEN>,
    /// Mesh network password
    pub mesh_password: String<MAX_PASSWORD_LEN>,
    /// Mesh TCP port
    pub mesh_port: u16,
    /// LED half-period with peers present
    pub blink_connected_ms: u32,
    /// LED half-period with no peers
    pub blink_disconnected_ms: u32,
    /// Heartbeat broadcast period, or `None` to stay silent
    pub heartbeat_interval_ms: Option<u32>,
    /// Network status log period, or `None` to log on topology change only
    pub status_interval_ms: Option<u32>,
    /// How the slave frame parser handles a broken header
    pub resync_policy: ResyncPolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let mut mesh_prefix = String::new();
        let _ = mesh_prefix.push_str(DEFAULT_MESH_PREFIX);
        let mut mesh_password = String::new();
        let _ = mesh_password.push_str(DEFAULT_MESH_PASSWORD);

        Self {
            baudrate: UartConfig::default().baudrate,
            mesh_prefix,
            mesh_password,
            mesh_port: DEFAULT_MESH_PORT,
            blink_connected_ms: BLINK_CONNECTED_MS,
            blink_disconnected_ms: BLINK_DISCONNECTED_MS,
            heartbeat_interval_ms: None,
            status_interval_ms: None,
            resync_policy: ResyncPolicy::default(),
        }
    }
}

impl NodeConfig {
    /// Replace the mesh network name
    pub fn set_mesh_prefix(&mut self, prefix: &str) -> Result<(), ConfigError> {
        if prefix.is_empty() {
            return Err(ConfigError::InvalidValue);
        }
        let mut value = String::new();
        value.push_str(prefix).map_err(|_| ConfigError::TooLong)?;
        self.mesh_prefix = value;
        Ok(())
    }

    /// Replace the mesh password
    pub fn set_mesh_password(&mut self, password: &str) -> Result<(), ConfigError> {
        let mut value = String::new();
        value.push_str(password).map_err(|_| ConfigError::TooLong)?;
        self.mesh_password = value;
        Ok(())
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baudrate == 0
            || self.mesh_prefix.is_empty()
            || self.mesh_port == 0
            || self.blink_connected_ms == 0
            || self.blink_disconnected_ms == 0
            || self.heartbeat_interval_ms == Some(0)
            || self.status_interval_ms == Some(0)
        {
            return Err(ConfigError::InvalidValue);
        }
        Ok(())
    }

    /// Mesh join parameters borrowed from this configuration
    pub fn mesh_config(&self) -> MeshConfig<'_> {
        MeshConfig {
            prefix: self.mesh_prefix.as_str(),
            password: self.mesh_password.as_str(),
            port: self.mesh_port,
        }
    }

    /// Slave UART settings (8N1 at the configured rate)
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baudrate,
            ..UartConfig::default()
        }
    }
}
