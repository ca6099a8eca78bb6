//! UART serial communication abstractions
//!
//! Provides non-blocking traits for the slave serial line that can be
//! implemented by chip-specific HALs. Nothing here waits for bytes: the
//! receive side hands over whatever the peripheral FIFO already holds.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Queue all of `data` for transmission
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read the next already-received byte, if any
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Read up to `buf.len()` already-received bytes
    ///
    /// Returns the number of bytes written into `buf`, which is zero when
    /// the receive FIFO is empty.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte()? {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

/// Baud rate of the slave actuator line
pub const SLAVE_BAUDRATE: u32 = 9600;

impl Default for UartConfig {
    /// 9600 baud, 8N1
    fn default() -> Self {
        Self {
            baudrate: SLAVE_BAUDRATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FifoRx {
        bytes: [u8; 4],
        pos: usize,
    }

    impl UartRx for FifoRx {
        type Error = ();

        fn read_byte(&mut self) -> Result<Option<u8>, ()> {
            let byte = self.bytes.get(self.pos).copied();
            if byte.is_some() {
                self.pos += 1;
            }
            Ok(byte)
        }
    }

    #[test]
    fn test_read_available_stops_when_fifo_empty() {
        let mut rx = FifoRx {
            bytes: [1, 2, 3, 4],
            pos: 0,
        };
        let mut buf = [0u8; 8];
        assert_eq!(rx.read_available(&mut buf), Ok(4));
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
        assert_eq!(rx.read_available(&mut buf), Ok(0));
    }

    #[test]
    fn test_read_available_respects_buffer_len() {
        let mut rx = FifoRx {
            bytes: [1, 2, 3, 4],
            pos: 0,
        };
        let mut buf = [0u8; 3];
        assert_eq!(rx.read_available(&mut buf), Ok(3));
        assert_eq!(&buf, &[1, 2, 3]);
        assert_eq!(rx.read_byte(), Ok(Some(4)));
        assert_eq!(rx.read_byte(), Ok(None));
    }

    #[test]
    fn test_default_config_is_9600_8n1() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
