use crate::{
    Result,
    constants::{MAX_CHANNEL, MIN_CHANNEL, PINCTRL_DRIVE_HIGH, PINCTRL_DRIVE_LOW},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical digital output channel (1-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32")]
pub struct Channel(u8);

impl Channel {
    /// Create a channel from the raw number received on the bus.
    ///
    /// # Errors
    /// Returns `Error::InvalidChannel` if the number is outside 1-6.
    pub fn new(channel: i32) -> Result<Self> {
        if channel < i32::from(MIN_CHANNEL) || channel > i32::from(MAX_CHANNEL) {
            return Err(Error::InvalidChannel { channel });
        }
        Ok(Channel(channel as u8))
    }

    /// Get the channel number.
    #[must_use]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Zero-based index into the channel tables.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.0 - MIN_CHANNEL)
    }

    /// All channels in ascending order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (MIN_CHANNEL..=MAX_CHANNEL).map(Channel)
    }
}

impl TryFrom<i32> for Channel {
    type Error = Error;

    fn try_from(channel: i32) -> Result<Self> {
        Channel::new(channel)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// BCM GPIO number on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pin(u8);

impl Pin {
    #[must_use]
    pub const fn new(bcm: u8) -> Self {
        Pin(bcm)
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logic level of a digital output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinLevel {
    High,
    Low,
}

impl PinLevel {
    /// The `pinctrl` drive instruction for this level (`dh` / `dl`).
    #[must_use]
    pub fn as_pinctrl_arg(&self) -> &'static str {
        match self {
            Self::High => PINCTRL_DRIVE_HIGH,
            Self::Low => PINCTRL_DRIVE_LOW,
        }
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for PinLevel {
    fn from(on: bool) -> Self {
        if on { Self::High } else { Self::Low }
    }
}

impl From<PinLevel> for bool {
    fn from(level: PinLevel) -> Self {
        level.is_high()
    }
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::High => write!(f, "on"),
            Self::Low => write!(f, "off"),
        }
    }
}

impl std::str::FromStr for PinLevel {
    type Err = Error;

    /// Parse the level token printed by `pinctrl get` (`hi` / `lo`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "hi" | "dh" => Ok(Self::High),
            "lo" | "dl" => Ok(Self::Low),
            other => Err(Error::InvalidPinLevel(other.to_string())),
        }
    }
}
