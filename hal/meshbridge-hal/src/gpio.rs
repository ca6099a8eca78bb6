//! GPIO pin abstractions
//!
//! The node only drives outputs (the status LED), so only the output side
//! is abstracted here.

/// Digital output pin
///
/// Implementations configure the pin as a push-pull output on creation
/// and only touch the output register afterwards.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Invert the current output level
    fn toggle(&mut self) {
        let high = self.is_set_high();
        self.set_state(!high);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(bool);

    impl OutputPin for Latch {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_toggle_inverts_level() {
        let mut pin = Latch(false);
        pin.toggle();
        assert!(pin.is_set_high());
        pin.toggle();
        assert!(!pin.is_set_high());
    }
}
