//! Pin controller trait definition.
//!
//! This trait is the seam between the actuator logic and whatever actually
//! changes a GPIO line. The production backend shells out to `pinctrl`; the
//! mock backend records writes in memory.
//!
//! The trait uses native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! so it is not object-safe. Dispatch over backends goes through
//! [`AnyPinController`](crate::devices::AnyPinController).

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::DeviceInfo;
use freya_core::{Pin, PinLevel};

/// Something that can drive and read BCM GPIO lines.
///
/// # Examples
///
/// ```no_run
/// use freya_core::{Pin, PinLevel};
/// use freya_hardware::traits::PinController;
/// use freya_hardware::Result;
///
/// async fn blink<P: PinController>(pins: &mut P, pin: Pin) -> Result<()> {
///     pins.write(pin, PinLevel::High).await?;
///     pins.write(pin, PinLevel::Low).await
/// }
/// ```
pub trait PinController: Send + Sync {
    /// Drive `pin` to `level`.
    ///
    /// Completes once the backend has applied the level, or fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The backend could not be invoked
    /// - The backend reported failure
    /// - The operation timed out
    async fn write(&mut self, pin: Pin, level: PinLevel) -> Result<()>;

    /// Read the current level of `pin` as reported by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be invoked or its report
    /// cannot be parsed.
    async fn read(&mut self, pin: Pin) -> Result<PinLevel>;

    /// Get backend information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
