//! Error types for pin-control operations.
//!
//! Every variant is non-fatal to the daemon: the bus interface logs it and
//! reports `false` to the caller.

use freya_core::Pin;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while driving or reading digital outputs.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Channel number outside the channel map.
    #[error(transparent)]
    InvalidChannel(#[from] freya_core::Error),

    /// The pin-control utility could not be run or reported failure.
    #[error("Failed to drive pin {pin}: {message}")]
    ActuatorInvocation { pin: Pin, message: String },

    /// The pin-control utility did not finish in time.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Unparseable output from the pin-control utility.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },
}

impl HardwareError {
    /// Create a new invocation error.
    pub fn invocation(pin: Pin, message: impl Into<String>) -> Self {
        Self::ActuatorInvocation {
            pin,
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// True when the error came from range-checking, before any invocation.
    pub fn is_invalid_channel(&self) -> bool {
        matches!(
            self,
            Self::InvalidChannel(freya_core::Error::InvalidChannel { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_error() {
        let error = HardwareError::invocation(Pin::new(21), "exit status: 1");
        assert!(matches!(error, HardwareError::ActuatorInvocation { .. }));
        assert_eq!(error.to_string(), "Failed to drive pin 21: exit status: 1");
    }

    #[test]
    fn test_timeout_error() {
        let error = HardwareError::timeout(2000);
        assert_eq!(error.to_string(), "Operation timeout after 2000ms");
    }

    #[test]
    fn test_invalid_channel_is_transparent() {
        let error = HardwareError::from(freya_core::Error::InvalidChannel { channel: 7 });
        assert!(error.is_invalid_channel());
        assert_eq!(error.to_string(), "Digital output 7 does not exist");
    }
}
