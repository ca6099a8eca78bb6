//! Resynchronizing frame parser
//!
//! Turns a noisy byte stream into validated frames. The parser never
//! reports an error: bytes that do not fit a `HEAD HEAD <11 bytes>` frame
//! with a matching checksum are dropped and counted, and scanning resumes
//! with the next byte.
//!
//! All state lives in the [`FrameParser`] value, so a frame split across
//! several drain cycles (or several UART interrupts) assembles correctly as
//! long as the same parser is used.

use crate::command::MotorState;
use crate::frame::{checksum, Frame, FRAME_HEAD, FRAME_LEN, OFFSET_CHECKSUM};
use crate::ring::RingBuffer;

/// What the parser does when a non-header byte follows a single header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResyncPolicy {
    /// Drop the byte and keep waiting for the second header byte
    ///
    /// Matches the behaviour deployed slaves were commissioned against. It
    /// tolerates one corrupted byte between the two header bytes, but a
    /// stray lone `0x7B` keeps the parser at the second-header stage until
    /// another `0x7B` arrives.
    #[default]
    HoldSecondHeader,
    /// Drop the byte and go back to hunting for the first header byte
    Restart,
}

/// Slave state extracted from a valid frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveReport {
    /// Slave address (frame offset 6)
    pub address: u8,
    /// Slave status (frame offset 7)
    pub status: u8,
}

impl SlaveReport {
    /// Decode the status byte as a motor state
    pub fn motor_state(&self) -> Option<MotorState> {
        MotorState::from_byte(self.status)
    }
}

impl From<&Frame> for SlaveReport {
    fn from(frame: &Frame) -> Self {
        Self {
            address: frame.address(),
            status: frame.status(),
        }
    }
}

/// Counters for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserStats {
    /// Frames that passed the checksum
    pub frames: u32,
    /// Complete frames rejected by the checksum
    pub checksum_errors: u32,
    /// Bytes dropped while looking for a header
    pub discarded: u32,
}

/// Partially assembled frame
///
/// `cursor` is the number of bytes stored so far. Values 0 and 1 mean the
/// parser is still looking for the two header bytes; 2 and above mean a
/// header has been seen and the body is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserState {
    buffer: [u8; FRAME_LEN],
    cursor: usize,
}

impl ParserState {
    /// Empty state, hunting for the first header byte
    pub const fn new() -> Self {
        Self {
            buffer: [0; FRAME_LEN],
            cursor: 0,
        }
    }

    /// Bytes stored so far (always below [`FRAME_LEN`])
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether both header bytes have been seen
    pub fn is_synced(&self) -> bool {
        self.cursor >= 2
    }

    /// Bytes collected for the frame in progress
    pub fn partial(&self) -> &[u8] {
        &self.buffer[..self.cursor]
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParserState,
    policy: ResyncPolicy,
    stats: ParserStats,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a parser with the default [`ResyncPolicy`]
    pub const fn new() -> Self {
        Self::with_policy(ResyncPolicy::HoldSecondHeader)
    }

    /// Create a parser with an explicit resync policy
    pub const fn with_policy(policy: ResyncPolicy) -> Self {
        Self {
            state: ParserState::new(),
            policy,
            stats: ParserStats {
                frames: 0,
                checksum_errors: 0,
                discarded: 0,
            },
        }
    }

    /// Drop any partial frame; counters are kept
    pub fn reset(&mut self) {
        self.state = ParserState::new();
    }

    /// Current partial-frame state
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Counters since creation
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Active resync policy
    pub fn policy(&self) -> ResyncPolicy {
        self.policy
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Some(frame)` when this byte completes a frame whose
    /// checksum matches, `None` otherwise.
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.state.cursor {
            0 => {
                if byte == FRAME_HEAD {
                    self.store(byte);
                } else {
                    self.discard();
                }
                None
            }
            1 => {
                if byte == FRAME_HEAD {
                    self.store(byte);
                } else {
                    self.discard();
                    if self.policy == ResyncPolicy::Restart {
                        self.state.cursor = 0;
                    }
                }
                None
            }
            _ => {
                self.store(byte);
                if self.state.cursor < FRAME_LEN {
                    return None;
                }
                self.complete()
            }
        }
    }

    /// Feed a slice of bytes, returning the first complete frame
    ///
    /// Bytes after the completed frame are not consumed; the number of
    /// bytes consumed is returned alongside the frame.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, Option<Frame>) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(frame) = self.feed(byte) {
                return (i + 1, Some(frame));
            }
        }
        (bytes.len(), None)
    }

    /// Run one drain cycle over `ring`, stopping at the first valid frame
    ///
    /// Bytes left in the ring after a valid frame are handled by the next
    /// call. Returns `None` once the ring is empty with no frame completed.
    pub fn drain<const N: usize>(&mut self, ring: &mut RingBuffer<u8, N>) -> Option<SlaveReport> {
        while let Some(byte) = ring.pop() {
            if let Some(frame) = self.feed(byte) {
                return Some(SlaveReport::from(&frame));
            }
        }
        None
    }

    /// Drain `ring` completely, handing every valid frame to `sink` in order
    ///
    /// Returns the number of frames delivered.
    pub fn drain_all<const N: usize, F>(
        &mut self,
        ring: &mut RingBuffer<u8, N>,
        mut sink: F,
    ) -> usize
    where
        F: FnMut(SlaveReport),
    {
        let mut delivered = 0;
        while let Some(report) = self.drain(ring) {
            sink(report);
            delivered += 1;
        }
        delivered
    }

    fn store(&mut self, byte: u8) {
        self.state.buffer[self.state.cursor] = byte;
        self.state.cursor += 1;
    }

    fn discard(&mut self) {
        self.stats.discarded = self.stats.discarded.wrapping_add(1);
    }

    fn complete(&mut self) -> Option<Frame> {
        let bytes = self.state.buffer;
        self.state.cursor = 0;

        if checksum(&bytes) != bytes[OFFSET_CHECKSUM] {
            self.stats.checksum_errors = self.stats.checksum_errors.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::debug!("frame checksum mismatch, dropping {=[u8]:x}", &bytes[..]);
            return None;
        }

        self.stats.frames = self.stats.frames.wrapping_add(1);
        Some(Frame::from_verified(bytes))
    }
}
