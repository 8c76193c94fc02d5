//! D-Bus endpoint for the Freya system actuators driver.
//!
//! This crate turns the digital outputs from `freya-hardware` into a bus
//! service: it claims `io.freya.SystemActuatorsDriver`, exports the actuator
//! interface, and sequences startup and shutdown.
//!
//! # Components
//!
//! - [`bus::ServiceBus`]: connect / claim / export / release seam, with
//!   [`bus::ZbusServiceBus`] for real D-Bus and [`mock::MockBus`] for tests
//! - [`interface::ActuatorInterface`]: the exported `setDigitalOutput`,
//!   `getDigitalOutput` and `updateActuator` members
//! - [`service::ActuatorService`]: the logic behind them
//! - [`daemon::ActuatorDaemon`]: lifecycle and scoped shutdown
//! - [`state::Lifecycle`]: the service state machine

pub mod bus;
pub mod daemon;
pub mod error;
pub mod interface;
pub mod mock;
pub mod service;
pub mod state;

pub use bus::{BusKind, ServiceBus, ZbusServiceBus};
pub use daemon::{ActuatorDaemon, ServiceConfig, ShutdownReason, ShutdownReport};
pub use error::{BusError, Result};
pub use interface::ActuatorInterface;
pub use service::{ActuatorService, SharedOutputs};
pub use state::{Lifecycle, ServiceState};
