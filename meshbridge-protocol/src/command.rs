//! Command and status codes understood by the actuator slave

/// Commands sent to the slave in the CMD byte
///
/// Codes without a name travel as [`SlaveCommand::Raw`]. A `Raw` holding a
/// named code is the same command: comparison and [`SlaveCommand::is_motion`]
/// go through the wire byte, and [`SlaveCommand::normalized`] maps it back
/// to the named variant.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveCommand {
    /// Stop the motor
    Stop,
    /// Run forward (clockwise)
    Forward,
    /// Run in reverse (counter-clockwise)
    Reverse,
    /// Any other code, passed through untouched
    Raw(u8),
}

// Wire format values
const CMD_STOP: u8 = 0x00;
const CMD_FORWARD: u8 = 0x01;
const CMD_REVERSE: u8 = 0x02;

impl SlaveCommand {
    /// Decode a command byte; unknown codes map to [`SlaveCommand::Raw`]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            CMD_STOP => SlaveCommand::Stop,
            CMD_FORWARD => SlaveCommand::Forward,
            CMD_REVERSE => SlaveCommand::Reverse,
            other => SlaveCommand::Raw(other),
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            SlaveCommand::Stop => CMD_STOP,
            SlaveCommand::Forward => CMD_FORWARD,
            SlaveCommand::Reverse => CMD_REVERSE,
            SlaveCommand::Raw(byte) => byte,
        }
    }

    /// Same command with a named code taken out of `Raw`
    pub fn normalized(self) -> Self {
        Self::from_byte(self.to_byte())
    }

    /// Returns true if the command changes the motor's motion
    pub fn is_motion(&self) -> bool {
        !matches!(self.normalized(), SlaveCommand::Raw(_))
    }
}

impl PartialEq for SlaveCommand {
    fn eq(&self, other: &Self) -> bool {
        self.to_byte() == other.to_byte()
    }
}

impl Eq for SlaveCommand {}

impl From<u8> for SlaveCommand {
    fn from(byte: u8) -> Self {
        SlaveCommand::from_byte(byte)
    }
}

impl From<SlaveCommand> for u8 {
    fn from(cmd: SlaveCommand) -> Self {
        cmd.to_byte()
    }
}

/// Motor state reported by the slave in the STATUS byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    #[default]
    Stopped,
    Clockwise,
    CounterClockwise,
}

const STATUS_STOPPED: u8 = 0x00;
const STATUS_CLOCKWISE: u8 = 0x01;
const STATUS_COUNTER_CLOCKWISE: u8 = 0x02;

impl MotorState {
    /// Parse a state from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            STATUS_STOPPED => Some(MotorState::Stopped),
            STATUS_CLOCKWISE => Some(MotorState::Clockwise),
            STATUS_COUNTER_CLOCKWISE => Some(MotorState::CounterClockwise),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            MotorState::Stopped => STATUS_STOPPED,
            MotorState::Clockwise => STATUS_CLOCKWISE,
            MotorState::CounterClockwise => STATUS_COUNTER_CLOCKWISE,
        }
    }

    /// Returns true if the motor is turning
    pub fn is_running(&self) -> bool {
        !matches!(self, MotorState::Stopped)
    }
}
