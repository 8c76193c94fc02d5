//! Freya system actuators driver.
//!
//! Claims `io.freya.SystemActuatorsDriver` on the system bus and drives the
//! Sense'n'Drive digital outputs through `pinctrl`.

use clap::Parser;
use freya_bus::{ActuatorDaemon, ZbusServiceBus};
use freya_hardware::DigitalOutputs;
use std::process::ExitCode;
use tracing::{error, info};

mod cli;
mod logging;
mod panic_guard;
mod signals;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);
    panic_guard::install(cli.panic_controller());

    info!("freya-actuators-driver {} starting...", freya_core::VERSION);

    match run(cli).await {
        Ok(code) => {
            info!("freya-actuators-driver stopped");
            ExitCode::from(code)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let stop = signals::shutdown_signal()?;

    let outputs = DigitalOutputs::new(cli.pin_controller());
    let daemon = ActuatorDaemon::new(ZbusServiceBus::new(), outputs, cli.service_config());

    let report = daemon.run(stop).await;
    if !report.outputs.is_complete() {
        error!(
            "Digital outputs {:?} may still be on",
            report
                .outputs
                .failed
                .iter()
                .map(|c| c.number())
                .collect::<Vec<_>>()
        );
    }

    Ok(report.exit_code)
}
