//! Enum wrapper for pin controller dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn PinController>`
//! is not available. [`AnyPinController`] gives the daemon one concrete type
//! that can hold either backend, chosen at startup.
//!
//! ```
//! use freya_hardware::devices::AnyPinController;
//! use freya_hardware::mock::MockPinController;
//!
//! let (pins, _handle) = MockPinController::new();
//! let any = AnyPinController::Mock(pins);
//! ```

use crate::mock::MockPinController;
use crate::pinctrl::PinctrlController;
use crate::traits::PinController;
use crate::{DeviceInfo, Result};
use freya_core::{Pin, PinLevel};

/// Enum wrapper for pin controller dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyPinController {
    /// The `pinctrl` command-line utility.
    Pinctrl(PinctrlController),

    /// In-memory controller for development and testing.
    Mock(MockPinController),
}

impl PinController for AnyPinController {
    async fn write(&mut self, pin: Pin, level: PinLevel) -> Result<()> {
        match self {
            Self::Pinctrl(device) => device.write(pin, level).await,
            Self::Mock(device) => device.write(pin, level).await,
        }
    }

    async fn read(&mut self, pin: Pin) -> Result<PinLevel> {
        match self {
            Self::Pinctrl(device) => device.read(pin).await,
            Self::Mock(device) => device.read(pin).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Pinctrl(device) => device.get_info().await,
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<PinctrlController> for AnyPinController {
    fn from(device: PinctrlController) -> Self {
        Self::Pinctrl(device)
    }
}

impl From<MockPinController> for AnyPinController {
    fn from(device: MockPinController) -> Self {
        Self::Mock(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinctrl::PinctrlConfig;

    #[tokio::test]
    async fn test_any_pin_controller_mock() {
        let (pins, handle) = MockPinController::new();
        let mut any = AnyPinController::from(pins);

        any.write(Pin::new(21), PinLevel::High).await.unwrap();
        assert_eq!(handle.invocation_count(), 1);

        let info = any.get_info().await.unwrap();
        assert_eq!(info.name, "Mock Pin Controller");
    }

    #[tokio::test]
    async fn test_any_pin_controller_pinctrl_info() {
        let any = AnyPinController::from(PinctrlController::new(PinctrlConfig::default()));
        let info = any.get_info().await.unwrap();
        assert_eq!(info.name, "pinctrl");
    }
}
