//! The exported `io.freya.SystemActuatorsDriver` interface.
//!
//! ```text
//! setDigitalOutput(i channel, b state) -> b success
//! getDigitalOutput(i channel)          -> b state
//! signal updateActuator(s description)
//! ```
//!
//! Callers only ever see booleans; error detail stays in the journal.

use crate::service::ActuatorService;
use tracing::warn;
use zbus::interface;
use zbus::object_server::SignalEmitter;

#[derive(Debug, Clone)]
pub struct ActuatorInterface {
    service: ActuatorService,
}

impl ActuatorInterface {
    pub fn new(service: ActuatorService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ActuatorService {
        &self.service
    }
}

#[interface(name = "io.freya.SystemActuatorsDriver")]
impl ActuatorInterface {
    #[zbus(name = "setDigitalOutput")]
    async fn set_digital_output(
        &self,
        channel: i32,
        state: bool,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> bool {
        match self.service.set_digital_output(channel, state).await {
            Ok(description) => {
                if let Err(e) = Self::update_actuator(&emitter, &description).await {
                    warn!("Failed to emit updateActuator: {}", e);
                }
                true
            }
            Err(_) => false,
        }
    }

    #[zbus(name = "getDigitalOutput")]
    async fn get_digital_output(&self, channel: i32) -> bool {
        self.service.get_digital_output(channel).await
    }

    #[zbus(signal, name = "updateActuator")]
    async fn update_actuator(emitter: &SignalEmitter<'_>, description: &str) -> zbus::Result<()>;
}
