use clap::{Parser, ValueEnum};
use freya_bus::{BusKind, ServiceConfig};
use freya_core::constants::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_PINCTRL_PROGRAM, DEFAULT_RELEASE_TIMEOUT_MS,
};
use freya_hardware::mock::MockPinController;
use freya_hardware::{AnyPinController, PinctrlConfig, PinctrlController};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "freya-actuators-driver")]
#[command(version)]
#[command(about = "Freya system actuators driver for the Edgeberry Sense'n'Drive cartridge", long_about = None)]
pub struct Cli {
    /// Pin-control executable
    #[arg(long, env = "FREYA_PINCTRL", default_value = DEFAULT_PINCTRL_PROGRAM, value_name = "PATH")]
    pub pinctrl: PathBuf,

    /// Timeout for a single pin-control invocation, in milliseconds
    #[arg(long, env = "FREYA_COMMAND_TIMEOUT_MS", default_value_t = DEFAULT_COMMAND_TIMEOUT_MS, value_name = "MS")]
    pub command_timeout_ms: u64,

    /// How long shutdown waits for the bus name release, in milliseconds
    #[arg(long, env = "FREYA_RELEASE_TIMEOUT_MS", default_value_t = DEFAULT_RELEASE_TIMEOUT_MS, value_name = "MS")]
    pub release_timeout_ms: u64,

    /// Register on the session bus instead of the system bus
    #[arg(long, env = "FREYA_SESSION_BUS")]
    pub session: bool,

    /// Record pin writes in memory instead of running pinctrl
    #[arg(long, env = "FREYA_DRY_RUN")]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, env = "FREYA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn pin_controller(&self) -> AnyPinController {
        if self.dry_run {
            let (controller, _handle) = MockPinController::with_name("Dry-run".to_string());
            return controller.into();
        }

        let config = PinctrlConfig::new(&self.pinctrl)
            .timeout(Duration::from_millis(self.command_timeout_ms));
        PinctrlController::new(config).into()
    }

    /// Controller for the panic-time sweep; none in dry-run mode.
    pub fn panic_controller(&self) -> Option<PinctrlController> {
        match self.pin_controller() {
            AnyPinController::Pinctrl(controller) => Some(controller),
            _ => None,
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        let bus = if self.session {
            BusKind::Session
        } else {
            BusKind::System
        };

        ServiceConfig::default()
            .bus(bus)
            .release_timeout(Duration::from_millis(self.release_timeout_ms))
    }
}
