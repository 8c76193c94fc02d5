//! Fixed identifiers for the Freya system actuators driver.
//!
//! # Bus identity
//!
//! The driver claims one well-known name on the system bus and exports a
//! single object implementing a single interface:
//!
//! | Item | Value |
//! |------|-------|
//! | Service name | `io.freya.SystemActuatorsDriver` |
//! | Object path | `/io/freya/SystemActuatorsDriver` |
//! | Interface | `io.freya.SystemActuatorsDriver` |
//!
//! # Sense'n'Drive digital outputs
//!
//! The Edgeberry Sense'n'Drive cartridge wires its six digital outputs to
//! the following BCM GPIO lines, in channel order D1..D6:
//!
//! ```text
//! D1  GPIO21  main lights
//! D2  GPIO20  heater
//! D3  GPIO16  misting pump
//! D4  GPIO13  reserved
//! D5  GPIO12  ventilation
//! D6  GPIO18  auxiliary lights
//! ```
//!
//! ```
//! use freya_core::constants::*;
//!
//! assert_eq!(CHANNEL_PINS.len(), CHANNEL_COUNT);
//! assert_eq!(CHANNEL_PINS[0], 21);
//! ```

// ============================================================================
// Bus identity
// ============================================================================

/// Well-known bus name claimed by the driver.
pub const DBUS_SERVICE: &str = "io.freya.SystemActuatorsDriver";

/// Object path of the exported actuator object.
pub const DBUS_PATH: &str = "/io/freya/SystemActuatorsDriver";

/// Interface name of the exported actuator object.
pub const DBUS_INTERFACE: &str = "io.freya.SystemActuatorsDriver";

// ============================================================================
// Channels
// ============================================================================

/// Number of digital output channels on the cartridge.
pub const CHANNEL_COUNT: usize = 6;

/// Lowest valid logical channel number.
pub const MIN_CHANNEL: u8 = 1;

/// Highest valid logical channel number.
pub const MAX_CHANNEL: u8 = CHANNEL_COUNT as u8;

/// BCM pin numbers for channels D1..D6, in order.
pub const CHANNEL_PINS: [u8; CHANNEL_COUNT] = [21, 20, 16, 13, 12, 18];

/// Human-readable role of each channel, in the same order as [`CHANNEL_PINS`].
pub const CHANNEL_ROLES: [&str; CHANNEL_COUNT] = [
    "main lights",
    "heater",
    "misting pump",
    "reserved",
    "ventilation",
    "auxiliary lights",
];

// ============================================================================
// Pin-control utility
// ============================================================================

/// Default pin-control executable, resolved through `PATH`.
pub const DEFAULT_PINCTRL_PROGRAM: &str = "pinctrl";

/// `pinctrl` argument driving an output high.
pub const PINCTRL_DRIVE_HIGH: &str = "dh";

/// `pinctrl` argument driving an output low.
pub const PINCTRL_DRIVE_LOW: &str = "dl";

/// Default timeout for one pin-control invocation, in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 2000;

/// Default bound on waiting for the bus name release during shutdown, in milliseconds.
pub const DEFAULT_RELEASE_TIMEOUT_MS: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_table_matches_channel_count() {
        assert_eq!(CHANNEL_PINS.len(), CHANNEL_COUNT);
        assert_eq!(CHANNEL_ROLES.len(), CHANNEL_COUNT);
        assert_eq!(usize::from(MAX_CHANNEL), CHANNEL_COUNT);
    }

    #[test]
    fn test_pins_are_distinct() {
        for (i, a) in CHANNEL_PINS.iter().enumerate() {
            for b in &CHANNEL_PINS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_bus_identity_is_consistent() {
        assert_eq!(DBUS_SERVICE, DBUS_INTERFACE);
        assert_eq!(DBUS_PATH, format!("/{}", DBUS_SERVICE.replace('.', "/")));
    }
}
