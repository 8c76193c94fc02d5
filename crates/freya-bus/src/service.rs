//! Bus-facing actuator operations.
//!
//! [`ActuatorService`] is what the exported interface calls into. It owns
//! the outputs behind an async mutex so one pin command runs at a time,
//! turns every failure into a log line, and hands callers nothing more than
//! a boolean.

use crate::error::{BusError, Result};
use freya_hardware::{AnyPinController, DigitalOutputs, HardwareError, OffReport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Outputs shared between the interface object and the shutdown path.
pub type SharedOutputs = Arc<Mutex<DigitalOutputs<AnyPinController>>>;

#[derive(Debug, Clone)]
pub struct ActuatorService {
    outputs: SharedOutputs,
    stopping: Arc<AtomicBool>,
}

impl ActuatorService {
    pub fn new(outputs: DigitalOutputs<AnyPinController>) -> Self {
        Self {
            outputs: Arc::new(Mutex::new(outputs)),
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shared(&self) -> SharedOutputs {
        Arc::clone(&self.outputs)
    }

    /// Refuse every later `set_digital_output`.
    ///
    /// Takes the outputs lock, so a write already in progress finishes
    /// first and is then overridden by the shutdown sweep.
    pub async fn begin_shutdown(&self) {
        let _outputs = self.outputs.lock().await;
        self.stopping.store(true, Ordering::SeqCst);
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Drive a channel and describe what was done.
    ///
    /// On success returns the `updateActuator` description, e.g.
    /// `"channel 2 (heater) on"`.
    ///
    /// # Errors
    ///
    /// `BusError::ShuttingDown` once [`begin_shutdown`](Self::begin_shutdown)
    /// has run, otherwise the hardware error. Both are logged.
    pub async fn set_digital_output(&self, channel: i32, state: bool) -> Result<String> {
        let mut outputs = self.outputs.lock().await;

        if self.is_stopping() {
            warn!("Ignoring digital output {} request during shutdown", channel);
            return Err(BusError::ShuttingDown);
        }

        match outputs.set_output(channel, state).await {
            Ok(()) => {
                let (channel, _) = outputs
                    .map()
                    .resolve(channel)
                    .map_err(HardwareError::from)?;
                let description = format!(
                    "channel {} ({}) {}",
                    channel,
                    outputs.map().role(channel),
                    if state { "on" } else { "off" }
                );
                info!("Digital output {}", description);
                Ok(description)
            }
            Err(e) if e.is_invalid_channel() => {
                warn!("{}", e);
                Err(e.into())
            }
            Err(e) => {
                warn!("Failed to set digital output {}: {}", channel, e);
                Err(e.into())
            }
        }
    }

    /// Read a channel back; `false` on any error.
    pub async fn get_digital_output(&self, channel: i32) -> bool {
        let mut outputs = self.outputs.lock().await;

        match outputs.get_output(channel).await {
            Ok(on) => on,
            Err(e) => {
                warn!("Failed to read digital output {}: {}", channel, e);
                false
            }
        }
    }

    /// Drive every channel low.
    pub async fn all_outputs_off(&self) -> OffReport {
        let report = self.outputs.lock().await.all_outputs_off().await;
        if report.is_complete() {
            info!("All digital outputs turned off");
        } else {
            warn!(
                "Turned off {} of {} digital outputs",
                report.succeeded.len(),
                report.attempted()
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freya_core::{Pin, PinLevel};
    use freya_hardware::mock::{MockPinController, MockPinHandle};

    fn service() -> (ActuatorService, MockPinHandle) {
        let (pins, handle) = MockPinController::new();
        let service = ActuatorService::new(DigitalOutputs::new(AnyPinController::Mock(pins)));
        (service, handle)
    }

    #[tokio::test]
    async fn test_set_describes_channel() {
        let (service, handle) = service();

        let description = service.set_digital_output(2, true).await.unwrap();
        assert_eq!(description, "channel 2 (heater) on");
        assert_eq!(handle.issued(), vec![(20, PinLevel::High)]);

        let description = service.set_digital_output(4, false).await.unwrap();
        assert_eq!(description, "channel 4 (reserved) off");
    }

    #[tokio::test]
    async fn test_set_invalid_channel_issues_nothing() {
        let (service, handle) = service();

        assert!(service.set_digital_output(0, true).await.is_err());
        assert!(service.set_digital_output(7, true).await.is_err());
        assert_eq!(handle.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_get_returns_false_on_error() {
        let (service, handle) = service();
        handle.set_level(Pin::new(21), PinLevel::High);
        assert!(service.get_digital_output(1).await);

        handle.fail_pin(Pin::new(21));
        assert!(!service.get_digital_output(1).await);
        assert!(!service.get_digital_output(42).await);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_serialised() {
        let (service, handle) = service();

        let mut tasks = Vec::new();
        for channel in 1..=6 {
            let service = service.clone();
            tasks.push(tokio::spawn(async move {
                service.set_digital_output(channel, true).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(handle.invocation_count(), 6);
    }

    #[tokio::test]
    async fn test_writes_refused_after_shutdown_begins() {
        let (service, handle) = service();

        service.begin_shutdown().await;
        let err = service.set_digital_output(2, true).await.unwrap_err();

        assert!(matches!(err, BusError::ShuttingDown));
        assert_eq!(handle.invocation_count(), 0);
        assert_eq!(handle.level(Pin::new(20)), None);

        // The shutdown sweep itself still goes through.
        assert!(service.all_outputs_off().await.is_complete());
        assert_eq!(handle.invocation_count(), 6);
    }

    #[tokio::test]
    async fn test_invalid_channel_error_kind() {
        let (service, _handle) = service();

        let err = service.set_digital_output(9, true).await.unwrap_err();
        assert!(matches!(err, BusError::Output(ref e) if e.is_invalid_channel()));
    }

    #[tokio::test]
    async fn test_all_outputs_off_through_shared_handle() {
        let (service, handle) = service();
        let shared = service.shared();

        shared.lock().await.set_output(1, true).await.unwrap();
        handle.clear();

        let report = service.all_outputs_off().await;
        assert_eq!(report.attempted(), 6);
        assert!(handle.issued().iter().all(|(_, level)| *level == PinLevel::Low));
    }
}
