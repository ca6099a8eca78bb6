//! Slave Serial Framing Protocol
//!
//! This crate implements the fixed-frame UART protocol between the mesh
//! bridge node and its actuator slave: a ring buffer that decouples byte
//! arrival from parsing, a resynchronizing frame parser, and the frame
//! builder used to emit commands.
//!
//! # Protocol Overview
//!
//! Every message is a 13-byte frame:
//! ```text
//! ┌───────┬─────┬─────────┬─────────┬──────┬────────┬─────┬─────┬──────────┬───────┐
//! │ HEAD  │ LEN │ TX_ADDR │ CONTROL │ ADDR │ STATUS │ CMD │ RSV │ CHECKSUM │ TAIL  │
//! │ 7B 7B │ 09  │ 1B      │ 03 01   │ 1B   │ 1B     │ 1B  │ 00  │ 1B       │ 7D 7D │
//! └───────┴─────┴─────────┴─────────┴──────┴────────┴─────┴─────┴──────────┴───────┘
//! ```
//!
//! The checksum is the XOR of bytes 2 through LEN. Nothing in this crate
//! performs I/O; callers push received bytes into a [`RingBuffer`] and hand
//! built [`Frame`]s to their UART.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod frame;
pub mod parser;
pub mod ring;

pub use command::{MotorState, SlaveCommand};
pub use frame::{checksum, Frame, FrameError, FRAME_HEAD, FRAME_LEN, FRAME_TAIL};
pub use parser::{FrameParser, ParserState, ParserStats, ResyncPolicy, SlaveReport};
pub use ring::RingBuffer;

/// Default receive queue depth in bytes
pub const RX_QUEUE_CAPACITY: usize = 512;
