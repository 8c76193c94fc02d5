//! Bus connection seam.
//!
//! [`ServiceBus`] covers what the daemon needs from an inter-process bus:
//! connect, claim a name, export the actuator object, notice when the bus
//! goes away, and give everything back. [`ZbusServiceBus`] implements it over a real
//! D-Bus connection; tests use [`MockBus`](crate::mock::MockBus).
//!
//! The connection is owned by the bus value: created in `connect`, dropped
//! in `close`, never shared as global state.

#![allow(async_fn_in_trait)]

use crate::error::{BusError, Result};
use crate::interface::ActuatorInterface;
use futures::StreamExt;
use std::fmt;
use tracing::{debug, info};
use zbus::fdo::{DBusProxy, RequestNameFlags, RequestNameReply};
use zbus::{Connection, MessageStream};

/// Which bus to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusKind {
    /// The system bus, where the production daemon lives.
    #[default]
    System,

    /// The per-user session bus, for development without root.
    Session,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system bus"),
            Self::Session => write!(f, "session bus"),
        }
    }
}

/// Inter-process bus operations used by the daemon lifecycle.
pub trait ServiceBus: Send {
    /// Open the connection.
    ///
    /// # Errors
    ///
    /// `BusError::BusUnavailable` if the bus cannot be reached.
    async fn connect(&mut self, kind: BusKind) -> Result<()>;

    /// Claim `name` exclusively, without queueing behind another owner.
    ///
    /// # Errors
    ///
    /// `BusError::NameAcquisitionFailed` if the name is owned elsewhere or
    /// the reply is anything but primary ownership.
    async fn acquire_name(&mut self, name: &str) -> Result<()>;

    /// Serve `interface` at `path`.
    ///
    /// # Errors
    ///
    /// `BusError::ExportFailed` if the object cannot be registered.
    async fn export(&mut self, path: &str, interface: ActuatorInterface) -> Result<()>;

    /// Stop serving the object at `path`. Not an error if nothing is there.
    async fn unexport(&mut self, path: &str) -> Result<()>;

    /// Resolve once the connection drops or `name` is taken away.
    ///
    /// Stays pending for as long as the service is healthy.
    async fn lost(&mut self, name: &str) -> BusError;

    /// Give `name` back to the bus.
    ///
    /// # Errors
    ///
    /// `BusError::ReleaseFailed` if the bus rejects the request.
    async fn release_name(&mut self, name: &str) -> Result<()>;

    /// Drop the connection. Idempotent.
    async fn close(&mut self);
}

/// [`ServiceBus`] over a `zbus` connection.
#[derive(Debug, Default)]
pub struct ZbusServiceBus {
    connection: Option<Connection>,
}

impl ZbusServiceBus {
    pub fn new() -> Self {
        Self { connection: None }
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    fn connected(&self) -> Result<&Connection> {
        self.connection.as_ref().ok_or(BusError::NotConnected)
    }
}

impl ServiceBus for ZbusServiceBus {
    async fn connect(&mut self, kind: BusKind) -> Result<()> {
        let connection = match kind {
            BusKind::System => Connection::system().await,
            BusKind::Session => Connection::session().await,
        }
        .map_err(BusError::unavailable)?;

        info!("D-Bus client connected to {}", kind);
        self.connection = Some(connection);
        Ok(())
    }

    async fn acquire_name(&mut self, name: &str) -> Result<()> {
        let reply = self
            .connected()?
            .request_name_with_flags(name, RequestNameFlags::DoNotQueue.into())
            .await
            .map_err(BusError::name_acquisition)?;

        match reply {
            RequestNameReply::PrimaryOwner | RequestNameReply::AlreadyOwner => {
                info!("D-Bus service name \"{}\" successfully acquired", name);
                Ok(())
            }
            other => Err(BusError::name_acquisition(format!(
                "unexpected reply while requesting \"{name}\": {other:?}"
            ))),
        }
    }

    async fn export(&mut self, path: &str, interface: ActuatorInterface) -> Result<()> {
        let registered = self
            .connected()?
            .object_server()
            .at(path, interface)
            .await
            .map_err(BusError::export)?;

        if !registered {
            return Err(BusError::export(format!(
                "an interface is already registered at {path}"
            )));
        }

        info!("D-Bus interface exported at {}", path);
        Ok(())
    }

    async fn unexport(&mut self, path: &str) -> Result<()> {
        let removed = self
            .connected()?
            .object_server()
            .remove::<ActuatorInterface, _>(path)
            .await
            .map_err(|e| BusError::export(format!("failed to remove {path}: {e}")))?;

        if removed {
            info!("D-Bus interface at {} withdrawn", path);
        }
        Ok(())
    }

    async fn lost(&mut self, name: &str) -> BusError {
        let connection = match self.connected() {
            Ok(connection) => connection.clone(),
            Err(e) => return e,
        };

        let proxy = match DBusProxy::new(&connection).await {
            Ok(proxy) => proxy,
            Err(e) => return BusError::connection_lost(e),
        };
        let mut name_lost = match proxy.receive_name_lost().await {
            Ok(stream) => stream,
            Err(e) => return BusError::connection_lost(e),
        };
        let mut messages = MessageStream::from(&connection);

        loop {
            tokio::select! {
                signal = name_lost.next() => match signal {
                    Some(signal) => {
                        if signal.args().is_ok_and(|args| args.name().as_str() == name) {
                            return BusError::connection_lost(format!(
                                "D-Bus name \"{name}\" was lost"
                            ));
                        }
                    }
                    None => return BusError::connection_lost("NameLost stream ended"),
                },
                message = messages.next() => match message {
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return BusError::connection_lost(e),
                    None => return BusError::connection_lost("connection closed"),
                },
            }
        }
    }

    async fn release_name(&mut self, name: &str) -> Result<()> {
        let released = self
            .connected()?
            .release_name(name)
            .await
            .map_err(BusError::release)?;

        if released {
            info!("Released D-Bus name \"{}\"", name);
        } else {
            debug!("D-Bus name \"{}\" was not owned", name);
        }
        Ok(())
    }

    async fn close(&mut self) {
        if self.connection.take().is_some() {
            debug!("D-Bus connection closed");
        }
    }
}
