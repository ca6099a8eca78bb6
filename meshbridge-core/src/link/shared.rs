//! Receive queue split between an interrupt handler and the main loop
//!
//! The UART RX interrupt is the only producer and the control loop the
//! only consumer. The two halves share nothing but the queue's head and
//! tail indices, which each side updates with a single atomic store, so
//! neither side ever masks interrupts or waits on the other.
//!
//! ```ignore
//! let mut queue: RxQueue<513> = RxQueue::new();
//! let (mut producer, mut consumer) = split(&mut queue);
//!
//! // Hand `producer` to the UART interrupt:
//! //     while let Some(byte) = uart.read_fifo() {
//! //         let _ = producer.push(byte);
//! //     }
//!
//! loop {
//!     if let Some(report) = consumer.drain_into(&mut parser) {
//!         // ...
//!     }
//! }
//! ```

use heapless::spsc::{Consumer, Producer, Queue};
use meshbridge_protocol::{FrameParser, SlaveReport};

/// Backing storage for a split receive queue; holds `N - 1` bytes
pub type RxQueue<const N: usize> = Queue<u8, N>;

/// Split `queue` into its interrupt-side and loop-side halves
pub fn split<const N: usize>(queue: &mut RxQueue<N>) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
    let (producer, consumer) = queue.split();
    (
        RxProducer {
            inner: producer,
            overflowed: 0,
        },
        RxConsumer { inner: consumer },
    )
}

/// Writing half of the receive queue, owned by the interrupt handler
pub struct RxProducer<'a, const N: usize> {
    inner: Producer<'a, u8, N>,
    overflowed: u32,
}

impl<'a, const N: usize> RxProducer<'a, N> {
    /// Append a byte, handing it back if the queue is full
    ///
    /// A full queue drops the newest byte and counts it as overflow.
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        self.inner.enqueue(byte).map_err(|byte| {
            self.overflowed = self.overflowed.wrapping_add(1);
            byte
        })
    }

    /// Append as much of `bytes` as fits, returning how many were taken
    pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
        let mut taken = 0;
        for &byte in bytes {
            if self.push(byte).is_ok() {
                taken += 1;
            }
        }
        taken
    }

    /// Bytes dropped because the queue was full
    pub fn overflowed(&self) -> u32 {
        self.overflowed
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        !self.inner.ready()
    }

    /// Number of bytes waiting for the consumer
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the consumer has taken every byte
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Maximum number of queued bytes
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

/// Reading half of the receive queue, owned by the control loop
pub struct RxConsumer<'a, const N: usize> {
    inner: Consumer<'a, u8, N>,
}

impl<'a, const N: usize> RxConsumer<'a, N> {
    /// Remove and return the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        self.inner.dequeue()
    }

    /// Oldest byte without removing it
    pub fn peek(&self) -> Option<u8> {
        self.inner.peek().copied()
    }

    /// Number of queued bytes
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }

    /// Run one drain cycle
    ///
    /// Stops at the first valid frame, like [`FrameParser::drain`].
    pub fn drain_into(&mut self, parser: &mut FrameParser) -> Option<SlaveReport> {
        while let Some(byte) = self.inner.dequeue() {
            if let Some(frame) = parser.feed(byte) {
                return Some(SlaveReport::from(&frame));
            }
        }
        None
    }

    /// Drain the queue completely, handing every valid frame to `sink`
    ///
    /// Returns the number of frames delivered.
    pub fn drain_all<F>(&mut self, parser: &mut FrameParser, mut sink: F) -> usize
    where
        F: FnMut(SlaveReport),
    {
        let mut delivered = 0;
        while let Some(report) = self.drain_into(parser) {
            sink(report);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use meshbridge_protocol::Frame;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn test_basic_operations() {
        let mut queue: RxQueue<4> = RxQueue::new();
        let (mut producer, mut consumer) = split(&mut queue);
        assert!(consumer.is_empty());
        producer.push(1).unwrap();
        producer.push(2).unwrap();
        assert_eq!(consumer.len(), 2);
        assert_eq!(consumer.peek(), Some(1));
        assert_eq!(consumer.pop(), Some(1));
        assert_eq!(consumer.pop(), Some(2));
        assert_eq!(consumer.pop(), None);
        assert!(producer.is_empty());
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let mut queue: RxQueue<4> = RxQueue::new();
        let (mut producer, mut consumer) = split(&mut queue);
        assert_eq!(producer.capacity(), 3);
        assert_eq!(producer.push_slice(&[1, 2, 3, 4, 5]), 3);
        assert!(producer.is_full());
        assert_eq!(producer.push(6), Err(6));
        assert_eq!(producer.overflowed(), 3);

        assert_eq!(consumer.pop(), Some(1));
        producer.push(7).unwrap();
        assert_eq!(consumer.pop(), Some(2));
        assert_eq!(consumer.pop(), Some(3));
        assert_eq!(consumer.pop(), Some(7));
    }

    #[test]
    fn test_drain_into_parser() {
        let mut queue: RxQueue<32> = RxQueue::new();
        let (mut producer, mut consumer) = split(&mut queue);
        producer.push_slice(Frame::report(0x07, 0x01).as_bytes());
        producer.push_slice(Frame::report(0x08, 0x02).as_bytes());

        let mut parser = FrameParser::new();
        assert_eq!(
            consumer.drain_into(&mut parser),
            Some(SlaveReport { address: 0x07, status: 0x01 })
        );
        assert_eq!(consumer.len(), 13);

        let mut rest = Vec::new();
        assert_eq!(consumer.drain_all(&mut parser, |r| rest.push(r)), 1);
        assert_eq!(rest, [SlaveReport { address: 0x08, status: 0x02 }]);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_producer_consumer_threads() {
        const FRAMES: u8 = 200;

        let mut queue: RxQueue<64> = RxQueue::new();
        let (mut producer, mut consumer) = split(&mut queue);
        let mut parser = FrameParser::new();
        let mut reports = Vec::new();

        thread::scope(|s| {
            s.spawn(move || {
                for i in 0..FRAMES {
                    for &b in Frame::report(i, i.wrapping_mul(3)).as_bytes() {
                        // Spin until the consumer frees a slot
                        while producer.push(b).is_err() {
                            thread::yield_now();
                        }
                    }
                }
            });

            while reports.len() < usize::from(FRAMES) {
                match consumer.drain_into(&mut parser) {
                    Some(report) => reports.push(report),
                    None => thread::yield_now(),
                }
            }
        });

        for (i, report) in reports.iter().enumerate() {
            let i = i as u8;
            assert_eq!(*report, SlaveReport { address: i, status: i.wrapping_mul(3) });
        }
        assert_eq!(parser.stats().checksum_errors, 0);
    }
}
