//! Digital output layer for the Freya system actuators driver.
//!
//! This crate drives the six digital outputs of the Edgeberry Sense'n'Drive
//! cartridge. It does not touch GPIO registers itself: a [`PinController`]
//! backend does, either the `pinctrl` utility or an in-memory mock.
//!
//! # Layers
//!
//! - [`traits::PinController`]: write/read one BCM pin.
//! - [`pinctrl::PinctrlController`]: runs `pinctrl set <pin> op <dh|dl>`,
//!   awaited with a timeout and exit-status check.
//! - [`mock::MockPinController`]: records writes for tests and dry runs.
//! - [`devices::AnyPinController`]: enum dispatch over the backends.
//! - [`outputs::DigitalOutputs`]: channel range check, resolution through the
//!   channel map, and bulk shutdown.
//!
//! # Example
//!
//! ```
//! use freya_hardware::devices::AnyPinController;
//! use freya_hardware::mock::MockPinController;
//! use freya_hardware::outputs::DigitalOutputs;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (pins, handle) = MockPinController::new();
//!     let mut outputs = DigitalOutputs::new(AnyPinController::Mock(pins));
//!
//!     let report = outputs.all_outputs_off().await;
//!     assert!(report.is_complete());
//!     assert_eq!(handle.invocation_count(), 6);
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] using [`HardwareError`].
//! None of them are fatal to the daemon.
//!
//! [`PinController`]: traits::PinController

pub mod devices;
pub mod error;
pub mod mock;
pub mod outputs;
pub mod pinctrl;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::AnyPinController;
pub use error::{HardwareError, Result};
pub use outputs::{DigitalOutputs, OffReport};
pub use pinctrl::{PinctrlConfig, PinctrlController};
pub use traits::PinController;
pub use types::{DeviceInfo, Invocation};
