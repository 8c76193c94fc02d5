//! Digital output actuator.
//!
//! [`DigitalOutputs`] combines the fixed [`ChannelMap`] with a
//! [`PinController`]. It keeps no record of what it last wrote: every call
//! issues a command, redundant or not.
//!
//! ```text
//! set_output(channel, on) ──► ChannelMap::resolve ──► PinController::write
//!                                   │
//!                                   └─► InvalidChannel (no write)
//! ```

use crate::error::Result;
use crate::traits::PinController;
use freya_core::{Channel, ChannelMap, PinLevel};
use tracing::{debug, warn};

/// Outcome of [`DigitalOutputs::all_outputs_off`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffReport {
    /// Channels that were driven low.
    pub succeeded: Vec<Channel>,

    /// Channels whose write failed.
    pub failed: Vec<Channel>,
}

impl OffReport {
    /// True when every channel was driven low.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of writes attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// The cartridge's digital outputs, addressed by logical channel.
///
/// # Examples
///
/// ```
/// use freya_core::PinLevel;
/// use freya_hardware::mock::MockPinController;
/// use freya_hardware::outputs::DigitalOutputs;
///
/// #[tokio::main]
/// async fn main() -> freya_hardware::Result<()> {
///     let (pins, handle) = MockPinController::new();
///     let mut outputs = DigitalOutputs::new(pins);
///
///     outputs.set_output(2, true).await?;
///     assert_eq!(handle.issued(), vec![(20, PinLevel::High)]);
///
///     assert!(outputs.set_output(7, true).await.is_err());
///     assert_eq!(handle.invocation_count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct DigitalOutputs<P> {
    map: ChannelMap,
    controller: P,
}

impl<P: PinController> DigitalOutputs<P> {
    /// Create outputs for the Sense'n'Drive layout.
    pub fn new(controller: P) -> Self {
        Self::with_map(ChannelMap::default(), controller)
    }

    pub fn with_map(map: ChannelMap, controller: P) -> Self {
        Self { map, controller }
    }

    pub fn map(&self) -> &ChannelMap {
        &self.map
    }

    pub fn controller(&self) -> &P {
        &self.controller
    }

    /// Drive a channel high (`on`) or low.
    ///
    /// # Errors
    ///
    /// Returns `InvalidChannel` without touching any pin when `channel` is
    /// outside 1-6, otherwise whatever the pin controller reports.
    pub async fn set_output(&mut self, channel: i32, on: bool) -> Result<()> {
        let (channel, pin) = self.map.resolve(channel)?;
        let level = PinLevel::from(on);

        debug!(
            "Setting digital output {} ({}) on pin {} {}",
            channel,
            self.map.role(channel),
            pin,
            level
        );

        self.controller.write(pin, level).await
    }

    /// Read back the level of a channel's pin.
    ///
    /// # Errors
    ///
    /// Returns `InvalidChannel` when `channel` is outside 1-6, otherwise
    /// whatever the pin controller reports.
    pub async fn get_output(&mut self, channel: i32) -> Result<bool> {
        let (_, pin) = self.map.resolve(channel)?;
        Ok(self.controller.read(pin).await?.is_high())
    }

    /// Drive every channel low, in channel order, ignoring failures.
    pub async fn all_outputs_off(&mut self) -> OffReport {
        let mut report = OffReport::default();

        for (channel, pin) in self.map.iter() {
            match self.controller.write(pin, PinLevel::Low).await {
                Ok(()) => report.succeeded.push(channel),
                Err(e) => {
                    warn!("Failed to turn off digital output {}: {}", channel, e);
                    report.failed.push(channel);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HardwareError;
    use crate::mock::MockPinController;
    use freya_core::Pin;
    use rstest::rstest;

    #[rstest]
    #[case(1, 21)]
    #[case(2, 20)]
    #[case(3, 16)]
    #[case(4, 13)]
    #[case(5, 12)]
    #[case(6, 18)]
    #[tokio::test]
    async fn test_set_output_issues_one_write(#[case] channel: i32, #[case] bcm: u8) {
        let (pins, handle) = MockPinController::new();
        let mut outputs = DigitalOutputs::new(pins);

        outputs.set_output(channel, true).await.unwrap();
        assert_eq!(handle.issued(), vec![(bcm, PinLevel::High)]);

        handle.clear();
        outputs.set_output(channel, false).await.unwrap();
        assert_eq!(handle.issued(), vec![(bcm, PinLevel::Low)]);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(-1)]
    #[tokio::test]
    async fn test_set_output_rejects_without_write(#[case] channel: i32) {
        let (pins, handle) = MockPinController::new();
        let mut outputs = DigitalOutputs::new(pins);

        let err = outputs.set_output(channel, true).await.unwrap_err();
        assert!(err.is_invalid_channel());
        assert_eq!(handle.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_set_output_is_not_deduplicated() {
        let (pins, handle) = MockPinController::new();
        let mut outputs = DigitalOutputs::new(pins);

        outputs.set_output(3, true).await.unwrap();
        outputs.set_output(3, true).await.unwrap();

        assert_eq!(
            handle.issued(),
            vec![(16, PinLevel::High), (16, PinLevel::High)]
        );
    }

    #[tokio::test]
    async fn test_set_output_propagates_controller_failure() {
        let (pins, handle) = MockPinController::new();
        handle.fail_pin(Pin::new(21));
        let mut outputs = DigitalOutputs::new(pins);

        let err = outputs.set_output(1, true).await.unwrap_err();
        assert!(matches!(err, HardwareError::ActuatorInvocation { .. }));
    }

    #[tokio::test]
    async fn test_all_outputs_off_drives_six_lows() {
        let (pins, handle) = MockPinController::new();
        let mut outputs = DigitalOutputs::new(pins);
        outputs.set_output(1, true).await.unwrap();
        outputs.set_output(5, true).await.unwrap();
        handle.clear();

        let report = outputs.all_outputs_off().await;

        assert!(report.is_complete());
        assert_eq!(report.attempted(), 6);
        assert_eq!(
            handle.issued(),
            vec![
                (21, PinLevel::Low),
                (20, PinLevel::Low),
                (16, PinLevel::Low),
                (13, PinLevel::Low),
                (12, PinLevel::Low),
                (18, PinLevel::Low),
            ]
        );
    }

    #[tokio::test]
    async fn test_all_outputs_off_continues_past_failures() {
        let (pins, handle) = MockPinController::new();
        handle.fail_pin(Pin::new(20));
        handle.fail_pin(Pin::new(12));
        let mut outputs = DigitalOutputs::new(pins);

        let report = outputs.all_outputs_off().await;

        assert!(!report.is_complete());
        assert_eq!(handle.invocation_count(), 6);
        let failed: Vec<u8> = report.failed.iter().map(|c| c.number()).collect();
        assert_eq!(failed, vec![2, 5]);
        assert_eq!(report.succeeded.len(), 4);
    }

    #[tokio::test]
    async fn test_get_output_reads_pin() {
        let (pins, handle) = MockPinController::new();
        let mut outputs = DigitalOutputs::new(pins);

        assert!(!outputs.get_output(6).await.unwrap());
        outputs.set_output(6, true).await.unwrap();
        assert!(outputs.get_output(6).await.unwrap());

        handle.set_level(Pin::new(18), PinLevel::Low);
        assert!(!outputs.get_output(6).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_output_rejects_out_of_range() {
        let (pins, _handle) = MockPinController::new();
        let mut outputs = DigitalOutputs::new(pins);

        assert!(outputs.get_output(0).await.unwrap_err().is_invalid_channel());
    }
}
