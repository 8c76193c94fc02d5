//! Mock pin controller for testing and development.
//!
//! Writes are recorded instead of touching GPIO lines. A
//! [`MockPinHandle`] shares the same state so tests (or the `--dry-run`
//! daemon) can inspect what was issued and inject failures.

use crate::{
    HardwareError, Result,
    traits::PinController,
    types::{DeviceInfo, Invocation},
};
use freya_core::{Pin, PinLevel};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Number of writes kept in the history; older ones are dropped first.
pub const INVOCATION_HISTORY_LIMIT: usize = 1024;

#[derive(Debug, Default)]
struct MockState {
    invocations: VecDeque<Invocation>,
    levels: HashMap<Pin, PinLevel>,
    failing: HashSet<Pin>,
}

/// Mock pin controller for testing and development.
///
/// # Examples
///
/// ```
/// use freya_core::{Pin, PinLevel};
/// use freya_hardware::mock::MockPinController;
/// use freya_hardware::traits::PinController;
///
/// #[tokio::main]
/// async fn main() -> freya_hardware::Result<()> {
///     let (mut pins, handle) = MockPinController::new();
///
///     pins.write(Pin::new(21), PinLevel::High).await?;
///
///     assert_eq!(handle.invocation_count(), 1);
///     assert_eq!(handle.level(Pin::new(21)), Some(PinLevel::High));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPinController {
    state: Arc<Mutex<MockState>>,

    /// Device name
    name: String,
}

impl MockPinController {
    /// Create a new mock pin controller with the default name.
    pub fn new() -> (Self, MockPinHandle) {
        Self::with_name("Mock Pin Controller".to_string())
    }

    /// Create a new mock pin controller with a custom name.
    pub fn with_name(name: String) -> (Self, MockPinHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));

        let controller = Self {
            state: Arc::clone(&state),
            name: name.clone(),
        };

        let handle = MockPinHandle { state, name };

        (controller, handle)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }
}

impl Default for MockPinController {
    fn default() -> Self {
        Self::new().0
    }
}

impl PinController for MockPinController {
    async fn write(&mut self, pin: Pin, level: PinLevel) -> Result<()> {
        let mut state = self.state();
        if state.invocations.len() == INVOCATION_HISTORY_LIMIT {
            state.invocations.pop_front();
        }
        state.invocations.push_back(Invocation::new(pin, level));

        if state.failing.contains(&pin) {
            return Err(HardwareError::invocation(pin, "injected failure"));
        }

        state.levels.insert(pin, level);
        Ok(())
    }

    async fn read(&mut self, pin: Pin) -> Result<PinLevel> {
        let state = self.state();
        if state.failing.contains(&pin) {
            return Err(HardwareError::invocation(pin, "injected failure"));
        }
        Ok(state.levels.get(&pin).copied().unwrap_or(PinLevel::Low))
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Sense'n'Drive"))
    }
}

/// Handle for inspecting and steering a mock pin controller.
///
/// Cloning the handle shares the same state.
#[derive(Debug, Clone)]
pub struct MockPinHandle {
    state: Arc<Mutex<MockState>>,

    /// Device name
    name: String,
}

impl MockPinHandle {
    /// Recorded writes, oldest first, including failed ones.
    ///
    /// At most [`INVOCATION_HISTORY_LIMIT`] are kept.
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.state).invocations.iter().cloned().collect()
    }

    /// Number of writes issued so far.
    pub fn invocation_count(&self) -> usize {
        lock(&self.state).invocations.len()
    }

    /// Writes as `(bcm, level)` pairs, convenient for assertions.
    pub fn issued(&self) -> Vec<(u8, PinLevel)> {
        lock(&self.state)
            .invocations
            .iter()
            .map(|i| (i.pin.as_u8(), i.level))
            .collect()
    }

    /// Forget recorded writes. Pin levels are kept.
    pub fn clear(&self) {
        lock(&self.state).invocations.clear();
    }

    /// Last level successfully written to `pin`.
    pub fn level(&self, pin: Pin) -> Option<PinLevel> {
        lock(&self.state).levels.get(&pin).copied()
    }

    /// Set the level reported by reads, as if changed outside the daemon.
    pub fn set_level(&self, pin: Pin, level: PinLevel) {
        lock(&self.state).levels.insert(pin, level);
    }

    /// Make every subsequent operation on `pin` fail.
    pub fn fail_pin(&self, pin: Pin) {
        lock(&self.state).failing.insert(pin);
    }

    /// Undo [`fail_pin`](Self::fail_pin).
    pub fn restore_pin(&self, pin: Pin) {
        lock(&self.state).failing.remove(&pin);
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

// A panic while holding the lock only happens inside a failing test; the
// recorded state is still meaningful afterwards.
fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_writes_in_order() {
        let (mut pins, handle) = MockPinController::new();

        pins.write(Pin::new(21), PinLevel::High).await.unwrap();
        pins.write(Pin::new(20), PinLevel::Low).await.unwrap();

        assert_eq!(
            handle.issued(),
            vec![(21, PinLevel::High), (20, PinLevel::Low)]
        );
    }

    #[tokio::test]
    async fn test_mock_repeated_writes_are_all_recorded() {
        let (mut pins, handle) = MockPinController::new();

        pins.write(Pin::new(16), PinLevel::High).await.unwrap();
        pins.write(Pin::new(16), PinLevel::High).await.unwrap();

        assert_eq!(handle.invocation_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_injected_failure() {
        let (mut pins, handle) = MockPinController::new();
        handle.fail_pin(Pin::new(12));

        let err = pins.write(Pin::new(12), PinLevel::High).await.unwrap_err();
        assert!(matches!(err, HardwareError::ActuatorInvocation { .. }));
        assert_eq!(handle.invocation_count(), 1);
        assert_eq!(handle.level(Pin::new(12)), None);

        handle.restore_pin(Pin::new(12));
        pins.write(Pin::new(12), PinLevel::High).await.unwrap();
        assert_eq!(handle.level(Pin::new(12)), Some(PinLevel::High));
    }

    #[tokio::test]
    async fn test_mock_read_defaults_low() {
        let (mut pins, handle) = MockPinController::new();
        assert_eq!(pins.read(Pin::new(18)).await.unwrap(), PinLevel::Low);

        handle.set_level(Pin::new(18), PinLevel::High);
        assert_eq!(pins.read(Pin::new(18)).await.unwrap(), PinLevel::High);
        assert_eq!(handle.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_handle_clone_shares_state() {
        let (mut pins, handle) = MockPinController::new();
        let clone = handle.clone();

        pins.write(Pin::new(21), PinLevel::Low).await.unwrap();
        assert_eq!(handle.invocation_count(), 1);
        assert_eq!(clone.invocation_count(), 1);

        clone.clear();
        assert_eq!(handle.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_history_is_bounded() {
        let (mut pins, handle) = MockPinController::new();

        pins.write(Pin::new(20), PinLevel::High).await.unwrap();
        for _ in 0..INVOCATION_HISTORY_LIMIT {
            pins.write(Pin::new(21), PinLevel::Low).await.unwrap();
        }

        assert_eq!(handle.invocation_count(), INVOCATION_HISTORY_LIMIT);
        assert!(handle.issued().iter().all(|(bcm, _)| *bcm == 21));
        // Levels are tracked independently of the history.
        assert_eq!(handle.level(Pin::new(20)), Some(PinLevel::High));
    }

    #[tokio::test]
    async fn test_mock_get_info() {
        let (pins, handle) = MockPinController::with_name("Bench".to_string());
        let info = pins.get_info().await.unwrap();
        assert_eq!(info.name, "Bench");
        assert_eq!(handle.name(), "Bench");
    }
}
