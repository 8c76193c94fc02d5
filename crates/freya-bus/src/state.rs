//! Service lifecycle state machine.
//!
//! # States
//!
//! - `Disconnected`: nothing done yet
//! - `Connecting`: opening the bus connection
//! - `NameAcquired`: well-known name owned exclusively
//! - `InterfaceExported`: actuator object served at its path
//! - `Running`: outputs initialised, handling calls
//! - `ShuttingDown`: cleanup in progress
//! - `NameReleased`: name handed back to the bus
//! - `Terminated`: cleanup finished
//!
//! # Valid Transitions
//!
//! - Disconnected → Connecting → NameAcquired → InterfaceExported → Running
//! - any state before `ShuttingDown` → ShuttingDown
//! - ShuttingDown → NameReleased → Terminated
//! - ShuttingDown → Terminated (release failed or never acquired)
//!
//! ```
//! use freya_bus::state::{Lifecycle, ServiceState};
//!
//! let mut lifecycle = Lifecycle::new();
//! lifecycle.transition_to(ServiceState::Connecting).unwrap();
//! assert!(lifecycle.transition_to(ServiceState::Running).is_err());
//! lifecycle.transition_to(ServiceState::ShuttingDown).unwrap();
//! ```

use crate::error::{BusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Disconnected,
    Connecting,
    NameAcquired,
    InterfaceExported,
    Running,
    ShuttingDown,
    NameReleased,
    Terminated,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ServiceState::Disconnected => "Disconnected",
            ServiceState::Connecting => "Connecting",
            ServiceState::NameAcquired => "NameAcquired",
            ServiceState::InterfaceExported => "InterfaceExported",
            ServiceState::Running => "Running",
            ServiceState::ShuttingDown => "ShuttingDown",
            ServiceState::NameReleased => "NameReleased",
            ServiceState::Terminated => "Terminated",
        };
        write!(f, "{}", state_str)
    }
}

impl ServiceState {
    /// Check if transition to target state is valid from this state.
    pub fn can_transition_to(&self, target: &ServiceState) -> bool {
        use ServiceState::*;

        matches!(
            (self, target),
            (Disconnected, Connecting)
                | (Connecting, NameAcquired)
                | (NameAcquired, InterfaceExported)
                | (InterfaceExported, Running)
                | (
                    Disconnected | Connecting | NameAcquired | InterfaceExported | Running,
                    ShuttingDown
                )
                | (ShuttingDown, NameReleased | Terminated)
                | (NameReleased, Terminated)
        )
    }

    /// True once cleanup has started.
    pub fn is_stopping(&self) -> bool {
        matches!(
            self,
            ServiceState::ShuttingDown | ServiceState::NameReleased | ServiceState::Terminated
        )
    }
}

/// A recorded state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ServiceState,
    pub to: ServiceState,
    pub at: Instant,
}

/// Tracks the current state and the path taken to reach it.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    current: ServiceState,
    history: Vec<StateTransition>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            current: ServiceState::Disconnected,
            history: Vec::new(),
        }
    }

    pub fn current_state(&self) -> ServiceState {
        self.current
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// States visited so far, starting with `Disconnected`.
    pub fn path(&self) -> Vec<ServiceState> {
        std::iter::once(ServiceState::Disconnected)
            .chain(self.history.iter().map(|t| t.to))
            .collect()
    }

    /// Attempt a transition.
    ///
    /// # Errors
    ///
    /// Returns `BusError::InvalidTransition` if the move is not allowed from
    /// the current state; the state is left unchanged.
    pub fn transition_to(&mut self, next: ServiceState) -> Result<StateTransition> {
        if !self.current.can_transition_to(&next) {
            return Err(BusError::InvalidTransition {
                from: self.current.to_string(),
                to: next.to_string(),
            });
        }

        let transition = StateTransition {
            from: self.current,
            to: next,
            at: Instant::now(),
        };
        debug!("Service state {} -> {}", transition.from, transition.to);

        self.current = next;
        self.history.push(transition.clone());
        Ok(transition)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
