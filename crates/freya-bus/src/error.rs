//! Error types for the bus endpoint.
//!
//! `BusUnavailable`, `NameAcquisitionFailed`, `ExportFailed` and
//! `ConnectionLost` are fatal: the daemon has no reason to run without its
//! bus identity.

use freya_hardware::HardwareError;

/// Result type alias for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The bus could not be reached.
    #[error("D-Bus client could not connect to the bus: {message}")]
    BusUnavailable { message: String },

    /// The well-known name is owned by someone else, or the reply was unexpected.
    #[error("D-Bus service name acquisition failed: {message}")]
    NameAcquisitionFailed { message: String },

    /// The actuator object could not be exported.
    #[error("Failed to export D-Bus interface: {message}")]
    ExportFailed { message: String },

    /// Releasing the name did not complete in time.
    #[error("Releasing the D-Bus name timed out after {duration_ms}ms")]
    ReleaseTimeout { duration_ms: u64 },

    /// Releasing the name failed.
    #[error("Failed to release D-Bus name: {message}")]
    ReleaseFailed { message: String },

    /// The connection dropped or the name was taken away while running.
    #[error("Lost the D-Bus connection: {message}")]
    ConnectionLost { message: String },

    /// Operation requires a connection that is not there.
    #[error("Not connected to the bus")]
    NotConnected,

    /// Output writes are refused once shutdown has begun.
    #[error("Service is shutting down")]
    ShuttingDown,

    /// A digital output operation failed.
    #[error(transparent)]
    Output(#[from] HardwareError),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl BusError {
    pub fn unavailable(message: impl ToString) -> Self {
        Self::BusUnavailable {
            message: message.to_string(),
        }
    }

    pub fn name_acquisition(message: impl ToString) -> Self {
        Self::NameAcquisitionFailed {
            message: message.to_string(),
        }
    }

    pub fn export(message: impl ToString) -> Self {
        Self::ExportFailed {
            message: message.to_string(),
        }
    }

    pub fn release(message: impl ToString) -> Self {
        Self::ReleaseFailed {
            message: message.to_string(),
        }
    }

    pub fn connection_lost(message: impl ToString) -> Self {
        Self::ConnectionLost {
            message: message.to_string(),
        }
    }

    /// True for errors that must terminate the daemon.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::BusUnavailable { .. }
                | Self::NameAcquisitionFailed { .. }
                | Self::ExportFailed { .. }
                | Self::ConnectionLost { .. }
                | Self::NotConnected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(BusError::unavailable("no socket").is_fatal());
        assert!(BusError::name_acquisition("exists").is_fatal());
        assert!(BusError::export("path taken").is_fatal());
        assert!(!BusError::ReleaseTimeout { duration_ms: 1000 }.is_fatal());
        assert!(!BusError::release("not owner").is_fatal());
        assert!(BusError::connection_lost("socket closed").is_fatal());
        assert!(!BusError::ShuttingDown.is_fatal());
        assert!(!BusError::from(HardwareError::timeout(2000)).is_fatal());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            BusError::name_acquisition("name already owned").to_string(),
            "D-Bus service name acquisition failed: name already owned"
        );
        assert_eq!(
            BusError::ReleaseTimeout { duration_ms: 250 }.to_string(),
            "Releasing the D-Bus name timed out after 250ms"
        );
    }
}
