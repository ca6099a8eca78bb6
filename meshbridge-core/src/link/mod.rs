//! Serial link to the actuator slave
//!
//! [`SlaveLink`] owns the receive queue and the frame parser for one UART.
//! The control loop calls [`SlaveLink::receive`] whenever the UART has
//! data (the serial-event hook) and [`SlaveLink::poll`] once per cycle.
//!
//! When bytes are collected from an interrupt handler instead, the queue
//! is split into an interrupt-side and a loop-side half; see [`shared`].

pub mod shared;

use meshbridge_hal::{UartRx, UartTx};
use meshbridge_protocol::{
    Frame, FrameParser, ParserStats, ResyncPolicy, RingBuffer, SlaveCommand, SlaveReport,
    RX_QUEUE_CAPACITY,
};

pub use shared::{split, RxConsumer, RxProducer, RxQueue};

/// Bytes moved from the UART per read call
const RX_CHUNK: usize = 32;

/// Receive-side counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Bytes accepted into the receive queue
    pub received: u32,
    /// Bytes dropped because the receive queue was full
    pub overflowed: u32,
    /// Frames written to the slave
    pub sent: u32,
}

/// UART link to a single slave
pub struct SlaveLink<Rx, Tx, const N: usize = RX_QUEUE_CAPACITY> {
    rx: Rx,
    tx: Tx,
    queue: RingBuffer<u8, N>,
    parser: FrameParser,
    last_report: Option<SlaveReport>,
    stats: LinkStats,
}

impl<Rx: UartRx, Tx: UartTx, const N: usize> SlaveLink<Rx, Tx, N> {
    /// Create a link with the default resync policy
    pub fn new(rx: Rx, tx: Tx) -> Self {
        Self::with_policy(rx, tx, ResyncPolicy::default())
    }

    /// Create a link with an explicit parser resync policy
    pub fn with_policy(rx: Rx, tx: Tx, policy: ResyncPolicy) -> Self {
        Self {
            rx,
            tx,
            queue: RingBuffer::with_fill(0),
            parser: FrameParser::with_policy(policy),
            last_report: None,
            stats: LinkStats::default(),
        }
    }

    /// Empty the receive queue and drop any partial frame
    pub fn reset(&mut self) {
        self.queue.reset();
        self.parser.reset();
    }

    /// Move every byte the UART has already received into the queue
    ///
    /// Bytes that do not fit are dropped (newest first) and counted in
    /// [`LinkStats::overflowed`]. Returns the number of bytes read.
    pub fn receive(&mut self) -> Result<usize, Rx::Error> {
        let mut chunk = [0u8; RX_CHUNK];
        let mut total = 0;
        loop {
            let n = self.rx.read_available(&mut chunk)?;
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                if self.queue.push(byte).is_ok() {
                    self.stats.received = self.stats.received.wrapping_add(1);
                } else {
                    self.stats.overflowed = self.stats.overflowed.wrapping_add(1);
                }
            }
            total += n;
            if n < RX_CHUNK {
                break;
            }
        }

        if total > 0 {
            #[cfg(feature = "defmt")]
            defmt::trace!("RX: {} bytes, queued {}", total, self.queue.len());
        }

        Ok(total)
    }

    /// Run one drain cycle over the receive queue
    ///
    /// Returns the first valid slave report found, if any. Remaining bytes
    /// stay queued for the next cycle.
    pub fn poll(&mut self) -> Option<SlaveReport> {
        let report = self.parser.drain(&mut self.queue)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("slave {=u8:#x} status {=u8:#x}", report.address, report.status);

        self.last_report = Some(report);
        Some(report)
    }

    /// Build a command frame and write it to the slave
    pub fn send(&mut self, address: u8, command: SlaveCommand) -> Result<(), Tx::Error> {
        self.send_frame(&Frame::command(address, command.to_byte()))
    }

    /// Write a prepared frame to the slave
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), Tx::Error> {
        self.tx.write_all(frame.as_bytes())?;
        self.tx.flush()?;
        self.stats.sent = self.stats.sent.wrapping_add(1);
        Ok(())
    }

    /// Most recent valid report from the slave
    pub fn last_report(&self) -> Option<SlaveReport> {
        self.last_report
    }

    /// Receive-side counters
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Parser counters
    pub fn parser_stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Bytes waiting to be parsed
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Get access to the UART receiver
    pub fn rx(&self) -> &Rx {
        &self.rx
    }

    /// Get access to the UART transmitter
    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    /// Get mutable access to the UART receiver
    pub fn rx_mut(&mut self) -> &mut Rx {
        &mut self.rx
    }
}
