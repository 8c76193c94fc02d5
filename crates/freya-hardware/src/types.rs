//! Common types shared across pin controller implementations.

use chrono::{DateTime, Utc};
use freya_core::{Pin, PinLevel};
use serde::{Deserialize, Serialize};

/// Pin controller information.
///
/// Logged once at startup so the journal shows which backend drives the
/// outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Backend name (e.g., "pinctrl", "Mock Pin Controller").
    pub name: String,

    /// Board or cartridge the outputs belong to.
    pub model: String,

    /// Executable invoked for each operation, if any.
    pub command: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            command: None,
        }
    }

    /// Set the executable path.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// One pin write issued to a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Target pin.
    pub pin: Pin,

    /// Requested level.
    pub level: PinLevel,

    /// When the write was issued.
    pub issued_at: DateTime<Utc>,
}

impl Invocation {
    pub fn new(pin: Pin, level: PinLevel) -> Self {
        Self {
            pin,
            level,
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfo::new("pinctrl", "Sense'n'Drive").with_command("/usr/bin/pinctrl");

        assert_eq!(info.name, "pinctrl");
        assert_eq!(info.model, "Sense'n'Drive");
        assert_eq!(info.command, Some("/usr/bin/pinctrl".to_string()));
    }

    #[test]
    fn test_invocation_serialization() {
        let invocation = Invocation::new(Pin::new(20), PinLevel::Low);
        let json = serde_json::to_string(&invocation).unwrap();
        let back: Invocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pin, Pin::new(20));
        assert_eq!(back.level, PinLevel::Low);
    }
}
