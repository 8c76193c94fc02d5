//! `pinctrl` command-line backend.
//!
//! Each write runs `<program> set <pin> op <dh|dl>` and each read runs
//! `<program> get <pin>`. The child is awaited with a timeout and its exit
//! status checked, so a failed write reaches the caller instead of being
//! dropped on the floor. The child is killed if the timeout fires.
//!
//! [`PinctrlController::all_low_blocking`] does the same sweep as
//! `DigitalOutputs::all_outputs_off` on the calling thread, for the panic
//! path where no runtime can be relied on.

use crate::error::{HardwareError, Result};
use crate::outputs::OffReport;
use crate::traits::PinController;
use crate::types::DeviceInfo;
use freya_core::constants::{DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_PINCTRL_PROGRAM};
use freya_core::{ChannelMap, Pin, PinLevel};
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, trace};

/// Configuration for the `pinctrl` backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinctrlConfig {
    /// Executable to run, looked up in `PATH` when relative.
    pub program: PathBuf,

    /// Upper bound on a single invocation.
    pub timeout: Duration,
}

impl Default for PinctrlConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PINCTRL_PROGRAM),
            timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
        }
    }
}

impl PinctrlConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Set the per-invocation timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pin controller backed by the Raspberry Pi `pinctrl` utility.
#[derive(Debug, Clone)]
pub struct PinctrlController {
    config: PinctrlConfig,
}

impl PinctrlController {
    pub fn new(config: PinctrlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PinctrlConfig {
        &self.config
    }

    pub(crate) fn set_args(pin: Pin, level: PinLevel) -> [String; 4] {
        [
            "set".to_string(),
            pin.to_string(),
            "op".to_string(),
            level.as_pinctrl_arg().to_string(),
        ]
    }

    pub(crate) fn get_args(pin: Pin) -> [String; 2] {
        ["get".to_string(), pin.to_string()]
    }

    /// Extract the level from a `pinctrl get` line.
    ///
    /// The utility prints e.g. `21: op dh pd | hi // GPIO21 = output`; the
    /// token after `|` is the sampled level.
    pub(crate) fn parse_level(pin: Pin, stdout: &str) -> Result<PinLevel> {
        let line = stdout.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let token = line
            .split_once('|')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .ok_or_else(|| {
                HardwareError::invalid_data(format!(
                    "no level in pinctrl output for pin {pin}: {:?}",
                    line.trim()
                ))
            })?;

        token.parse::<PinLevel>().map_err(|_| {
            HardwareError::invalid_data(format!("unknown level {token:?} for pin {pin}"))
        })
    }

    async fn run(&self, pin: Pin, args: &[String]) -> Result<Output> {
        let program = self.config.program.display().to_string();
        trace!("Running {} {}", program, args.join(" "));

        let mut command = Command::new(&self.config.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.config.timeout, command.output())
            .await
            .map_err(|_| HardwareError::timeout(self.config.timeout.as_millis() as u64))?
            .map_err(|e| HardwareError::invocation(pin, format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HardwareError::invocation(
                pin,
                format!("{program} exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(output)
    }

    /// Drive every pin in `map` low, blocking the calling thread.
    ///
    /// Each invocation is bounded by the configured timeout and killed
    /// when it runs over. Failures are counted, never returned.
    pub fn all_low_blocking(&self, map: &ChannelMap) -> OffReport {
        let mut report = OffReport::default();

        for (channel, pin) in map.iter() {
            if self.run_blocking(&Self::set_args(pin, PinLevel::Low)) {
                report.succeeded.push(channel);
            } else {
                report.failed.push(channel);
            }
        }

        report
    }

    fn run_blocking(&self, args: &[String]) -> bool {
        let spawned = std::process::Command::new(&self.config.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = spawned else {
            return false;
        };

        let deadline = Instant::now() + self.config.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return status.success(),
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5));
                }
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return false;
                }
            }
        }
    }
}

impl Default for PinctrlController {
    fn default() -> Self {
        Self::new(PinctrlConfig::default())
    }
}

impl PinController for PinctrlController {
    async fn write(&mut self, pin: Pin, level: PinLevel) -> Result<()> {
        self.run(pin, &Self::set_args(pin, level)).await?;
        debug!("Pin {} driven {}", pin, level.as_pinctrl_arg());
        Ok(())
    }

    async fn read(&mut self, pin: Pin) -> Result<PinLevel> {
        let output = self.run(pin, &Self::get_args(pin)).await?;
        Self::parse_level(pin, &String::from_utf8_lossy(&output.stdout))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("pinctrl", "Edgeberry Sense'n'Drive")
            .with_command(self.config.program.display().to_string()))
    }
}
