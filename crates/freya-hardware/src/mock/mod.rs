//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! programmatically without requiring physical hardware.

pub mod pin;

pub use pin::{INVOCATION_HISTORY_LIMIT, MockPinController, MockPinHandle};
