//! Mock bus for testing the daemon lifecycle without a D-Bus daemon.

use crate::bus::{BusKind, ServiceBus};
use crate::error::{BusError, Result};
use crate::interface::ActuatorInterface;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

/// One call made against the mock bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    Connect(BusKind),
    AcquireName(String),
    Export(String),
    Unexport(String),
    ReleaseName(String),
    Close,
}

#[derive(Debug, Default)]
struct MockBusState {
    calls: Vec<BusCall>,
    exported: Option<ActuatorInterface>,
    unreachable: bool,
    name_taken: bool,
    release_delay: Option<Duration>,
    dropped: bool,
}

/// In-memory [`ServiceBus`].
///
/// # Examples
///
/// ```
/// use freya_bus::bus::{BusKind, ServiceBus};
/// use freya_bus::mock::{BusCall, MockBus};
///
/// #[tokio::main]
/// async fn main() {
///     let (mut bus, handle) = MockBus::new();
///     handle.set_unreachable(true);
///
///     assert!(bus.connect(BusKind::System).await.is_err());
///     assert_eq!(handle.calls(), vec![BusCall::Connect(BusKind::System)]);
/// }
/// ```
#[derive(Debug)]
pub struct MockBus {
    state: Arc<Mutex<MockBusState>>,
    dropped: watch::Receiver<bool>,
    connected: bool,
}

impl MockBus {
    pub fn new() -> (Self, MockBusHandle) {
        let state = Arc::new(Mutex::new(MockBusState::default()));
        let (dropped_tx, dropped) = watch::channel(false);
        let bus = Self {
            state: Arc::clone(&state),
            dropped,
            connected: false,
        };
        let handle = MockBusHandle {
            state,
            dropped: Arc::new(dropped_tx),
        };
        (bus, handle)
    }

    fn state(&self) -> MutexGuard<'_, MockBusState> {
        lock(&self.state)
    }
}

impl ServiceBus for MockBus {
    async fn connect(&mut self, kind: BusKind) -> Result<()> {
        let mut state = self.state();
        state.calls.push(BusCall::Connect(kind));
        if state.unreachable {
            return Err(BusError::unavailable("no bus socket"));
        }
        drop(state);
        self.connected = true;
        Ok(())
    }

    async fn acquire_name(&mut self, name: &str) -> Result<()> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        let mut state = self.state();
        state.calls.push(BusCall::AcquireName(name.to_string()));
        if state.name_taken {
            return Err(BusError::name_acquisition(format!("{name} exists")));
        }
        Ok(())
    }

    async fn export(&mut self, path: &str, interface: ActuatorInterface) -> Result<()> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        let mut state = self.state();
        state.calls.push(BusCall::Export(path.to_string()));
        state.exported = Some(interface);
        Ok(())
    }

    async fn unexport(&mut self, path: &str) -> Result<()> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        let mut state = self.state();
        state.calls.push(BusCall::Unexport(path.to_string()));
        state.exported = None;
        Ok(())
    }

    async fn lost(&mut self, _name: &str) -> BusError {
        if !self.connected {
            return BusError::NotConnected;
        }
        let dropped = self.dropped.wait_for(|dropped| *dropped).await.is_ok();
        if dropped {
            return BusError::connection_lost("bus connection dropped");
        }
        // Handle gone: nobody can drop the connection any more.
        std::future::pending::<BusError>().await
    }

    async fn release_name(&mut self, name: &str) -> Result<()> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        let delay = {
            let mut state = self.state();
            state.calls.push(BusCall::ReleaseName(name.to_string()));
            if state.dropped {
                return Err(BusError::release("connection already dropped"));
            }
            state.release_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn close(&mut self) {
        if self.connected {
            self.state().calls.push(BusCall::Close);
            self.connected = false;
        }
    }
}

/// Handle for steering and inspecting a [`MockBus`].
#[derive(Debug, Clone)]
pub struct MockBusHandle {
    state: Arc<Mutex<MockBusState>>,
    dropped: Arc<watch::Sender<bool>>,
}

impl MockBusHandle {
    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<BusCall> {
        lock(&self.state).calls.clone()
    }

    /// Interface object handed to `export`, if any.
    pub fn exported(&self) -> Option<ActuatorInterface> {
        lock(&self.state).exported.clone()
    }

    /// Make `connect` fail.
    pub fn set_unreachable(&self, unreachable: bool) {
        lock(&self.state).unreachable = unreachable;
    }

    /// Make `acquire_name` fail as if another instance owned the name.
    pub fn set_name_taken(&self, taken: bool) {
        lock(&self.state).name_taken = taken;
    }

    /// Drop the connection from the bus side, resolving `lost`.
    pub fn drop_connection(&self) {
        lock(&self.state).dropped = true;
        self.dropped.send_replace(true);
    }

    /// Delay `release_name` completion.
    pub fn set_release_delay(&self, delay: Duration) {
        lock(&self.state).release_delay = Some(delay);
    }
}

fn lock(state: &Mutex<MockBusState>) -> MutexGuard<'_, MockBusState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
