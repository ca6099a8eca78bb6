//! Status LED
//!
//! The LED blinks slowly while at least one mesh peer is reachable and
//! fast while the node is alone.

use meshbridge_hal::OutputPin;

/// Blink half-period with mesh peers present
pub const BLINK_CONNECTED_MS: u32 = 1000;

/// Blink half-period with no mesh peers
pub const BLINK_DISCONNECTED_MS: u32 = 100;

/// Connection-state LED driver
pub struct StatusIndicator<P> {
    pin: P,
    on: bool,
    last_toggle_ms: u32,
    connected_ms: u32,
    disconnected_ms: u32,
}

impl<P: OutputPin> StatusIndicator<P> {
    /// Create an indicator with the default blink rates
    pub fn new(pin: P) -> Self {
        Self::with_intervals(pin, BLINK_CONNECTED_MS, BLINK_DISCONNECTED_MS)
    }

    /// Create an indicator with custom blink rates
    pub fn with_intervals(pin: P, connected_ms: u32, disconnected_ms: u32) -> Self {
        Self {
            pin,
            on: false,
            last_toggle_ms: 0,
            connected_ms,
            disconnected_ms,
        }
    }

    /// Drive the LED off
    pub fn init(&mut self) {
        self.off();
    }

    /// Turn the LED on
    pub fn on(&mut self) {
        self.pin.set_high();
        self.on = true;
    }

    /// Turn the LED off
    pub fn off(&mut self) {
        self.pin.set_low();
        self.on = false;
    }

    /// Invert the LED
    pub fn toggle(&mut self) {
        if self.on {
            self.off();
        } else {
            self.on();
        }
    }

    /// Check if the LED is lit
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Blink interval for the given connection state
    pub fn interval(&self, connected: bool) -> u32 {
        if connected {
            self.connected_ms
        } else {
            self.disconnected_ms
        }
    }

    /// Toggle the LED if more than one blink interval has passed
    ///
    /// Returns true if the LED changed state.
    pub fn update(&mut self, now_ms: u32, connected: bool) -> bool {
        if now_ms.wrapping_sub(self.last_toggle_ms) > self.interval(connected) {
            self.toggle();
            self.last_toggle_ms = now_ms;
            return true;
        }
        false
    }

    /// Get access to the underlying pin
    pub fn pin(&self) -> &P {
        &self.pin
    }
}
