//! Daemon lifecycle: startup, steady state and scoped shutdown.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  connect / acquire / export  ┌────────────┐
//! │ Actuator   │─────────────────────────────►│ ServiceBus │
//! │ Daemon     │◄──── setDigitalOutput ───────│ (zbus)     │
//! └─────┬──────┘                              └────────────┘
//!       │ all_outputs_off
//!       ▼
//! ┌────────────┐
//! │ Digital    │──► pinctrl
//! │ Outputs    │
//! └────────────┘
//! ```
//!
//! While running, the daemon waits for either the stop future or the bus
//! going away; the latter is a fatal error.
//!
//! Shutdown runs in a fixed order: refuse further writes and withdraw the
//! object, release the name and wait for the reply (bounded by
//! `release_timeout`), drive every output low, close the connection. Each
//! step is attempted even if an earlier one failed.
//!
//! # Examples
//!
//! ```
//! use freya_bus::daemon::{ActuatorDaemon, ServiceConfig, ShutdownReason};
//! use freya_bus::mock::MockBus;
//! use freya_hardware::{AnyPinController, DigitalOutputs};
//! use freya_hardware::mock::MockPinController;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (bus, _bus_handle) = MockBus::new();
//!     let (pins, pin_handle) = MockPinController::new();
//!     let outputs = DigitalOutputs::new(AnyPinController::Mock(pins));
//!
//!     let daemon = ActuatorDaemon::new(bus, outputs, ServiceConfig::default());
//!     let report = daemon
//!         .run(async { ShutdownReason::Signal("SIGTERM".to_string()) })
//!         .await;
//!
//!     assert_eq!(report.exit_code, 0);
//!     assert_eq!(pin_handle.invocation_count(), 12);
//! }
//! ```

use crate::bus::{BusKind, ServiceBus};
use crate::error::{BusError, Result};
use crate::interface::ActuatorInterface;
use crate::service::ActuatorService;
use crate::state::{Lifecycle, ServiceState};
use freya_core::constants::{DBUS_PATH, DBUS_SERVICE, DEFAULT_RELEASE_TIMEOUT_MS};
use freya_hardware::{AnyPinController, DigitalOutputs, OffReport, PinController};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Bus identity and shutdown bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bus to register on.
    pub bus: BusKind,

    /// Well-known name to claim.
    pub name: String,

    /// Object path to export the interface at.
    pub path: String,

    /// How long to wait for the name release reply.
    pub release_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::System,
            name: DBUS_SERVICE.to_string(),
            path: DBUS_PATH.to_string(),
            release_timeout: Duration::from_millis(DEFAULT_RELEASE_TIMEOUT_MS),
        }
    }
}

impl ServiceConfig {
    /// Set the bus to register on.
    pub fn bus(mut self, bus: BusKind) -> Self {
        self.bus = bus;
        self
    }

    /// Set the name release timeout.
    pub fn release_timeout(mut self, timeout: Duration) -> Self {
        self.release_timeout = timeout;
        self
    }
}

/// Why the daemon is stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A termination or interrupt signal.
    Signal(String),

    /// An unrecoverable error.
    Fatal(String),
}

impl ShutdownReason {
    /// Process exit status for this reason.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Signal(_) => 0,
            Self::Fatal(_) => 1,
        }
    }
}

/// What shutdown managed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub reason: ShutdownReason,

    /// The name release completed within the timeout.
    pub name_released: bool,

    pub outputs: OffReport,

    pub exit_code: u8,
}

/// Owns the bus connection and the outputs for the life of the process.
#[derive(Debug)]
pub struct ActuatorDaemon<B> {
    bus: B,
    service: ActuatorService,
    config: ServiceConfig,
    lifecycle: Lifecycle,
}

impl<B: ServiceBus> ActuatorDaemon<B> {
    pub fn new(bus: B, outputs: DigitalOutputs<AnyPinController>, config: ServiceConfig) -> Self {
        Self {
            bus,
            service: ActuatorService::new(outputs),
            config,
            lifecycle: Lifecycle::new(),
        }
    }

    pub fn state(&self) -> ServiceState {
        self.lifecycle.current_state()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn service(&self) -> &ActuatorService {
        &self.service
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Bring the service up: connect, claim the name, export, outputs off.
    ///
    /// # Errors
    ///
    /// Any error here is fatal; the caller should run [`shutdown`](Self::shutdown)
    /// with [`ShutdownReason::Fatal`].
    pub async fn start(&mut self) -> Result<()> {
        self.lifecycle.transition_to(ServiceState::Connecting)?;
        self.bus.connect(self.config.bus).await?;

        self.bus.acquire_name(&self.config.name).await?;
        self.lifecycle.transition_to(ServiceState::NameAcquired)?;

        let interface = ActuatorInterface::new(self.service.clone());
        self.bus.export(&self.config.path, interface).await?;
        self.lifecycle.transition_to(ServiceState::InterfaceExported)?;

        let info = self.service.shared().lock().await.controller().get_info().await;
        match info {
            Ok(info) => info!("Driving outputs through {} ({})", info.name, info.model),
            Err(e) => debug!("Pin controller info unavailable: {}", e),
        }

        self.service.all_outputs_off().await;
        self.lifecycle.transition_to(ServiceState::Running)?;

        info!(
            "{} running on {} at {}",
            self.config.name, self.config.bus, self.config.path
        );
        Ok(())
    }

    /// Best-effort cleanup, safe to call from any state.
    pub async fn shutdown(&mut self, reason: ShutdownReason) -> ShutdownReport {
        match &reason {
            ShutdownReason::Signal(signal) => info!("Received {}, shutting down", signal),
            ShutdownReason::Fatal(message) => error!("Shutting down after fatal error: {}", message),
        }

        if let Err(e) = self.lifecycle.transition_to(ServiceState::ShuttingDown) {
            warn!("{}", e);
        }

        self.service.begin_shutdown().await;
        match self.bus.unexport(&self.config.path).await {
            Ok(()) => {}
            Err(BusError::NotConnected) => debug!("Not connected, nothing to withdraw"),
            Err(e) => warn!("{}", e),
        }

        let name_released = self.release_name().await;
        let outputs = self.service.all_outputs_off().await;
        self.bus.close().await;

        if name_released {
            if let Err(e) = self.lifecycle.transition_to(ServiceState::NameReleased) {
                debug!("{}", e);
            }
        }
        if let Err(e) = self.lifecycle.transition_to(ServiceState::Terminated) {
            debug!("{}", e);
        }

        ShutdownReport {
            exit_code: reason.exit_code(),
            reason,
            name_released,
            outputs,
        }
    }

    /// Start, wait for `stop` or the loss of the bus, then shut down.
    ///
    /// If startup fails, `stop` is never polled and shutdown runs
    /// immediately with exit code 1. Losing the bus while running also
    /// exits with 1.
    pub async fn run<F>(mut self, stop: F) -> ShutdownReport
    where
        F: Future<Output = ShutdownReason>,
    {
        let reason = match self.start().await {
            Ok(()) => {
                tokio::select! {
                    reason = stop => reason,
                    e = self.bus.lost(&self.config.name) => {
                        error!("{}", e);
                        ShutdownReason::Fatal(e.to_string())
                    }
                }
            }
            Err(e) => {
                error!("{}", e);
                ShutdownReason::Fatal(e.to_string())
            }
        };

        self.shutdown(reason).await
    }

    async fn release_name(&mut self) -> bool {
        let timeout = self.config.release_timeout;

        match tokio::time::timeout(timeout, self.bus.release_name(&self.config.name)).await {
            Ok(Ok(())) => true,
            Ok(Err(BusError::NotConnected)) => {
                debug!("Not connected, no D-Bus name to release");
                false
            }
            Ok(Err(e)) => {
                warn!("{}", e);
                false
            }
            Err(_) => {
                warn!(
                    "{}",
                    BusError::ReleaseTimeout {
                        duration_ms: timeout.as_millis() as u64
                    }
                );
                false
            }
        }
    }
}
