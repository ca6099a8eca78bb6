//! Persistent storage abstractions
//!
//! Provides a key-value trait for the small amount of data the node keeps
//! across reboots. Implementations back it with on-chip flash or EEPROM
//! emulation.

/// Storage keys for persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Node configuration (binary postcard format)
    NodeConfig = 0,
    /// Reserved for future use
    Reserved1 = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::NodeConfig),
            1 => Some(StorageKey::Reserved1),
            _ => None,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Key-value storage
///
/// Operations complete before returning; the node calls them only during
/// `begin`, never from the control loop.
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool;

    /// Erase all stored data
    fn erase_all(&mut self) -> Result<(), FlashError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_roundtrip() {
        for key in [StorageKey::NodeConfig, StorageKey::Reserved1] {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(StorageKey::from_u8(0xFF), None);
    }
}
