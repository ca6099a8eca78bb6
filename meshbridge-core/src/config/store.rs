//! Configuration persistence
//!
//! The configuration is stored under [`StorageKey::NodeConfig`] as postcard
//! binary wrapped in a magic/version header.

use meshbridge_hal::flash::{FlashError, FlashStorage, StorageKey};
use serde::{Deserialize, Serialize};

use super::{ConfigError, NodeConfig};

/// Magic number identifying a stored node configuration
pub const CONFIG_MAGIC: u32 = 0x4D42_4E43; // "MBNC"

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum serialized configuration size
pub const MAX_CONFIG_SIZE: usize = 192;

/// Configuration record as written to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredConfig {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// The configuration itself
    pub config: NodeConfig,
}

impl StoredConfig {
    /// Wrap a configuration with the current header
    pub fn new(config: NodeConfig) -> Self {
        Self {
            magic: CONFIG_MAGIC,
            version: CONFIG_VERSION,
            config,
        }
    }

    /// Check the header, handing back the configuration
    pub fn into_config(self) -> Result<NodeConfig, ConfigError> {
        if self.magic != CONFIG_MAGIC {
            return Err(ConfigError::BadMagic);
        }
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Load the stored configuration
pub fn load_config<S: FlashStorage>(storage: &mut S) -> Result<NodeConfig, ConfigError> {
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let len = storage.read(StorageKey::NodeConfig, &mut buffer)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("Read {} bytes of config from storage", len);

    let stored: StoredConfig =
        postcard::from_bytes(&buffer[..len]).map_err(|_| ConfigError::Deserialize)?;
    stored.into_config()
}

/// Load the stored configuration, falling back to defaults on any error
pub fn load_config_or_default<S: FlashStorage>(storage: &mut S) -> NodeConfig {
    match load_config(storage) {
        Ok(config) => {
            #[cfg(feature = "defmt")]
            defmt::info!("Loaded node config from storage");
            config
        }
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("No stored config, using defaults");
            NodeConfig::default()
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to load config: {:?}, using defaults", _e);
            NodeConfig::default()
        }
    }
}

/// Validate and store a configuration
pub fn save_config<S: FlashStorage>(
    storage: &mut S,
    config: &NodeConfig,
) -> Result<(), ConfigError> {
    config.validate()?;

    let stored = StoredConfig::new(config.clone());
    let mut buffer = [0u8; MAX_CONFIG_SIZE];
    let bytes = postcard::to_slice(&stored, &mut buffer).map_err(|_| ConfigError::Serialize)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("Saving {} bytes of config to storage", bytes.len());

    storage.write(StorageKey::NodeConfig, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_PASSWORD_LEN, MAX_PREFIX_LEN};
    use heapless::Vec;
    use meshbridge_protocol::ResyncPolicy;

    #[derive(Default)]
    struct MockStorage {
        data: Option<Vec<u8, 256>>,
        fail_reads: bool,
    }

    impl FlashStorage for MockStorage {
        fn read(&mut self, _key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
            if self.fail_reads {
                return Err(FlashError::Flash);
            }
            let data = self.data.as_ref().ok_or(FlashError::NotFound)?;
            if data.len() > buffer.len() {
                return Err(FlashError::BufferTooSmall);
            }
            buffer[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }

        fn write(&mut self, _key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
            self.data = Some(Vec::from_slice(data).map_err(|_| FlashError::Full)?);
            Ok(())
        }

        fn exists(&mut self, _key: StorageKey) -> bool {
            self.data.is_some()
        }

        fn erase_all(&mut self) -> Result<(), FlashError> {
            self.data = None;
            Ok(())
        }
    }

    fn write_raw(storage: &mut MockStorage, stored: &StoredConfig) {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let bytes = postcard::to_slice(stored, &mut buffer).unwrap();
        storage.write(StorageKey::NodeConfig, bytes).unwrap();
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MockStorage::default();
        let mut config = NodeConfig::default();
        config.set_mesh_prefix("Greenhouse").unwrap();
        config.heartbeat_interval_ms = Some(3000);
        config.resync_policy = ResyncPolicy::Restart;

        save_config(&mut storage, &config).unwrap();
        assert!(storage.exists(StorageKey::NodeConfig));
        assert_eq!(load_config(&mut storage), Ok(config));
    }

    #[test]
    fn test_longest_strings_fit() {
        let mut storage = MockStorage::default();
        let mut config = NodeConfig::default();
        let prefix = [b'p'; MAX_PREFIX_LEN];
        let password = [b'w'; MAX_PASSWORD_LEN];
        config.set_mesh_prefix(core::str::from_utf8(&prefix).unwrap()).unwrap();
        config.set_mesh_password(core::str::from_utf8(&password).unwrap()).unwrap();
        config.heartbeat_interval_ms = Some(u32::MAX);
        config.status_interval_ms = Some(u32::MAX);

        save_config(&mut storage, &config).unwrap();
        assert_eq!(load_config(&mut storage), Ok(config));
    }

    #[test]
    fn test_missing_config_falls_back() {
        let mut storage = MockStorage::default();
        assert_eq!(
            load_config(&mut storage),
            Err(ConfigError::Flash(FlashError::NotFound))
        );
        assert_eq!(load_config_or_default(&mut storage), NodeConfig::default());
    }

    #[test]
    fn test_bad_magic() {
        let mut storage = MockStorage::default();
        let mut stored = StoredConfig::new(NodeConfig::default());
        stored.magic = 0xDEAD_BEEF;
        write_raw(&mut storage, &stored);
        assert_eq!(load_config(&mut storage), Err(ConfigError::BadMagic));
    }

    #[test]
    fn test_version_mismatch() {
        let mut storage = MockStorage::default();
        let mut stored = StoredConfig::new(NodeConfig::default());
        stored.version = CONFIG_VERSION + 1;
        write_raw(&mut storage, &stored);
        assert_eq!(load_config(&mut storage), Err(ConfigError::VersionMismatch));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let mut storage = MockStorage::default();
        storage.write(StorageKey::NodeConfig, &[0xFF; 3]).unwrap();
        assert_eq!(load_config(&mut storage), Err(ConfigError::Deserialize));
        assert_eq!(load_config_or_default(&mut storage), NodeConfig::default());
    }

    #[test]
    fn test_flash_error_falls_back() {
        let mut storage = MockStorage {
            fail_reads: true,
            ..Default::default()
        };
        assert_eq!(load_config_or_default(&mut storage), NodeConfig::default());
    }

    #[test]
    fn test_invalid_config_is_not_saved() {
        let mut storage = MockStorage::default();
        let config = NodeConfig {
            mesh_port: 0,
            ..NodeConfig::default()
        };
        assert_eq!(save_config(&mut storage, &config), Err(ConfigError::InvalidValue));
        assert!(!storage.exists(StorageKey::NodeConfig));
    }
}
