//! Frame layout, checksum, and frame construction for the slave protocol.
//!
//! Every frame is exactly 13 bytes:
//!
//! | Offset | Field     | Value                                   |
//! |--------|-----------|-----------------------------------------|
//! | 0, 1   | HEAD      | `0x7B 0x7B`                             |
//! | 2      | LEN       | `0x09`, also the checksum window's end  |
//! | 3      | TX_ADDR   | sender/target address                   |
//! | 4, 5   | CONTROL   | `0x03 0x01`                             |
//! | 6      | ADDR      | slave address                           |
//! | 7      | STATUS    | slave state (slave → node)              |
//! | 8      | CMD       | command code (node → slave)             |
//! | 9      | RESERVED  | `0x00`                                  |
//! | 10     | CHECKSUM  | XOR of bytes `2..=LEN`                  |
//! | 11, 12 | TAIL      | `0x7D 0x7D`                             |

/// Header marker, sent twice
pub const FRAME_HEAD: u8 = 0x7B;

/// Trailer marker, sent twice
pub const FRAME_TAIL: u8 = 0x7D;

/// Length of every frame in bytes
pub const FRAME_LEN: usize = 13;

/// Value of the LEN byte in well-formed frames
pub const FRAME_LEN_FIELD: u8 = 0x09;

/// Fixed control bytes at offsets 4 and 5
pub const FRAME_CONTROL: [u8; 2] = [0x03, 0x01];

// Field offsets
const OFFSET_LEN: usize = 2;
const OFFSET_TX_ADDR: usize = 3;
const OFFSET_CONTROL: usize = 4;
const OFFSET_ADDR: usize = 6;
const OFFSET_STATUS: usize = 7;
const OFFSET_CMD: usize = 8;
pub(crate) const OFFSET_CHECKSUM: usize = 10;
const OFFSET_TAIL: usize = 11;

/// Errors from validating an externally supplied frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer than [`FRAME_LEN`] bytes were supplied
    Truncated,
    /// Checksum byte does not match the covered window
    InvalidChecksum,
}

/// XOR checksum over the window `frame[2..=frame[2]]`
///
/// The LEN byte doubles as the inclusive end of the window. A LEN smaller
/// than 2 gives an empty window (checksum 0); a LEN past the end of the
/// frame is clamped to the last byte.
pub fn checksum(frame: &[u8; FRAME_LEN]) -> u8 {
    let end = usize::from(frame[OFFSET_LEN]).min(FRAME_LEN - 1);
    frame
        .get(OFFSET_LEN..=end)
        .unwrap_or(&[])
        .iter()
        .fold(0, |acc, &b| acc ^ b)
}

/// A complete 13-byte frame
///
/// Constructed either by the builders ([`Frame::command`],
/// [`Frame::report`]) or by the parser once a checksum has been verified,
/// so a `Frame` value always carries a matching checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bytes: [u8; FRAME_LEN],
}

impl Frame {
    /// Build a command frame addressed to a slave
    pub fn command(address: u8, command: u8) -> Self {
        Self::build(address, 0x00, command)
    }

    /// Build a status report frame as a slave would send it
    pub fn report(address: u8, status: u8) -> Self {
        Self::build(address, status, 0x00)
    }

    fn build(address: u8, status: u8, command: u8) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = FRAME_HEAD;
        bytes[1] = FRAME_HEAD;
        bytes[OFFSET_LEN] = FRAME_LEN_FIELD;
        bytes[OFFSET_TX_ADDR] = address;
        bytes[OFFSET_CONTROL..OFFSET_CONTROL + 2].copy_from_slice(&FRAME_CONTROL);
        bytes[OFFSET_ADDR] = address;
        bytes[OFFSET_STATUS] = status;
        bytes[OFFSET_CMD] = command;
        bytes[OFFSET_CHECKSUM] = checksum(&bytes);
        bytes[OFFSET_TAIL] = FRAME_TAIL;
        bytes[OFFSET_TAIL + 1] = FRAME_TAIL;
        Self { bytes }
    }

    /// Wrap raw bytes whose checksum has already been verified
    pub(crate) fn from_verified(bytes: [u8; FRAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Validate the first [`FRAME_LEN`] bytes of `data` as a frame
    ///
    /// Only the checksum is checked, the same rule the stream parser
    /// applies once it has locked onto a header.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FrameError> {
        let bytes: [u8; FRAME_LEN] = data
            .get(..FRAME_LEN)
            .and_then(|head| head.try_into().ok())
            .ok_or(FrameError::Truncated)?;
        if checksum(&bytes) != bytes[OFFSET_CHECKSUM] {
            return Err(FrameError::InvalidChecksum);
        }
        Ok(Self { bytes })
    }

    /// Raw wire bytes
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// LEN field
    pub fn length(&self) -> u8 {
        self.bytes[OFFSET_LEN]
    }

    /// Sender/target address at offset 3
    pub fn tx_address(&self) -> u8 {
        self.bytes[OFFSET_TX_ADDR]
    }

    /// Slave address
    pub fn address(&self) -> u8 {
        self.bytes[OFFSET_ADDR]
    }

    /// Slave status (meaningful on frames received from the slave)
    pub fn status(&self) -> u8 {
        self.bytes[OFFSET_STATUS]
    }

    /// Command code (meaningful on frames sent to the slave)
    pub fn command_code(&self) -> u8 {
        self.bytes[OFFSET_CMD]
    }

    /// Checksum byte
    pub fn checksum(&self) -> u8 {
        self.bytes[OFFSET_CHECKSUM]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
