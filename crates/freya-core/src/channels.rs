//! Channel-to-pin resolution.
//!
//! The [`ChannelMap`] is fixed at compile time and never mutated. It only
//! range-checks: a reserved channel still resolves to its pin.

use crate::{
    Result,
    constants::{CHANNEL_PINS, CHANNEL_ROLES},
    types::{Channel, Pin},
};

/// Immutable mapping from logical channel to BCM pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMap {
    pins: [Pin; CHANNEL_PINS.len()],
}

impl ChannelMap {
    /// The Sense'n'Drive cartridge layout.
    pub const SENSE_N_DRIVE: ChannelMap = ChannelMap::from_bcm(CHANNEL_PINS);

    const fn from_bcm(bcm: [u8; CHANNEL_PINS.len()]) -> Self {
        let mut pins = [Pin::new(0); CHANNEL_PINS.len()];
        let mut i = 0;
        while i < bcm.len() {
            pins[i] = Pin::new(bcm[i]);
            i += 1;
        }
        Self { pins }
    }

    /// Pin wired to a validated channel.
    #[must_use]
    pub fn pin(&self, channel: Channel) -> Pin {
        self.pins[channel.index()]
    }

    /// Validate a raw channel number and resolve its pin.
    ///
    /// # Errors
    /// Returns `Error::InvalidChannel` if the number is outside 1-6.
    ///
    /// ```
    /// use freya_core::ChannelMap;
    ///
    /// let (channel, pin) = ChannelMap::default().resolve(1).unwrap();
    /// assert_eq!(channel.number(), 1);
    /// assert_eq!(pin.as_u8(), 21);
    ///
    /// assert!(ChannelMap::default().resolve(7).is_err());
    /// ```
    pub fn resolve(&self, channel: i32) -> Result<(Channel, Pin)> {
        let channel = Channel::new(channel)?;
        Ok((channel, self.pin(channel)))
    }

    /// Role label of a channel, used in log lines and signal descriptions.
    #[must_use]
    pub fn role(&self, channel: Channel) -> &'static str {
        CHANNEL_ROLES[channel.index()]
    }

    /// Iterate every (channel, pin) pair in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, Pin)> + '_ {
        Channel::all().map(|channel| (channel, self.pin(channel)))
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self::SENSE_N_DRIVE
    }
}
