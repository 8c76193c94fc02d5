//! Integration tests for the daemon lifecycle.
//!
//! These run the full start → wait → shutdown sequence against the mock bus
//! and mock pin controller, checking exit codes and the pin writes seen by
//! the hardware.

use freya_bus::mock::{BusCall, MockBus};
use freya_bus::{ActuatorDaemon, BusKind, ServiceConfig, ServiceState, ShutdownReason};
use freya_core::PinLevel;
use freya_hardware::mock::MockPinController;
use freya_hardware::{AnyPinController, DigitalOutputs};
use std::time::Duration;
use tokio::sync::oneshot;

const ALL_LOW: [(u8, PinLevel); 6] = [
    (21, PinLevel::Low),
    (20, PinLevel::Low),
    (16, PinLevel::Low),
    (13, PinLevel::Low),
    (12, PinLevel::Low),
    (18, PinLevel::Low),
];

/// Startup with a reachable bus keeps running after six low writes, and a
/// termination signal produces six more low writes and exit status 0.
#[tokio::test]
async fn test_signal_while_running() {
    let (bus, bus_handle) = MockBus::new();
    let (pins, pin_handle) = MockPinController::new();
    let daemon = ActuatorDaemon::new(
        bus,
        DigitalOutputs::new(AnyPinController::Mock(pins)),
        ServiceConfig::default(),
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let stop = async move {
        let _ = stop_rx.await;
        ShutdownReason::Signal("SIGTERM".to_string())
    };
    let run = tokio::spawn(daemon.run(stop));

    // Wait for startup to finish.
    for _ in 0..100 {
        if pin_handle.invocation_count() == 6 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(pin_handle.issued(), ALL_LOW.to_vec());
    assert!(bus_handle.exported().is_some());
    assert!(!run.is_finished());

    // Client call while running.
    let interface = bus_handle.exported().unwrap();
    interface.service().set_digital_output(1, true).await.unwrap();
    pin_handle.clear();

    stop_tx.send(()).unwrap();
    let report = run.await.unwrap();

    assert_eq!(report.exit_code, 0);
    assert!(report.name_released);
    assert_eq!(pin_handle.issued(), ALL_LOW.to_vec());
    let calls = bus_handle.calls();
    let unexport = calls
        .iter()
        .position(|c| *c == BusCall::Unexport("/io/freya/SystemActuatorsDriver".to_string()))
        .unwrap();
    let release = calls
        .iter()
        .position(|c| *c == BusCall::ReleaseName("io.freya.SystemActuatorsDriver".to_string()))
        .unwrap();
    assert!(unexport < release);
    assert!(bus_handle.exported().is_none());
}

/// Losing the bus while running is fatal: six low writes and exit status 1.
#[tokio::test]
async fn test_bus_lost_while_running() {
    let (bus, bus_handle) = MockBus::new();
    let (pins, pin_handle) = MockPinController::new();
    let daemon = ActuatorDaemon::new(
        bus,
        DigitalOutputs::new(AnyPinController::Mock(pins)),
        ServiceConfig::default(),
    );

    let run = tokio::spawn(daemon.run(std::future::pending::<ShutdownReason>()));

    for _ in 0..100 {
        if pin_handle.invocation_count() == 6 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let interface = bus_handle.exported().unwrap();
    interface.service().set_digital_output(2, true).await.unwrap();
    pin_handle.clear();

    bus_handle.drop_connection();
    let report = run.await.unwrap();

    assert_eq!(report.exit_code, 1);
    assert!(matches!(report.reason, ShutdownReason::Fatal(_)));
    assert_eq!(pin_handle.issued(), ALL_LOW.to_vec());
    assert_eq!(
        pin_handle.level(freya_core::Pin::new(20)),
        Some(PinLevel::Low)
    );
    assert_eq!(bus_handle.calls().last(), Some(&BusCall::Close));
}

/// Startup with the bus unreachable exports nothing and exits with status 1.
#[tokio::test]
async fn test_bus_unreachable() {
    let (bus, bus_handle) = MockBus::new();
    bus_handle.set_unreachable(true);
    let (pins, _pin_handle) = MockPinController::new();
    let daemon = ActuatorDaemon::new(
        bus,
        DigitalOutputs::new(AnyPinController::Mock(pins)),
        ServiceConfig::default().bus(BusKind::Session),
    );

    // A failed start never waits on the stop future.
    let report = daemon
        .run(std::future::pending::<ShutdownReason>())
        .await;

    assert_eq!(report.exit_code, 1);
    assert!(!report.name_released);
    assert!(bus_handle.exported().is_none());
    assert_eq!(bus_handle.calls(), vec![BusCall::Connect(BusKind::Session)]);
}

/// Another instance owning the name is fatal.
#[tokio::test]
async fn test_name_already_owned() {
    let (bus, bus_handle) = MockBus::new();
    bus_handle.set_name_taken(true);
    let (pins, pin_handle) = MockPinController::new();
    let daemon = ActuatorDaemon::new(
        bus,
        DigitalOutputs::new(AnyPinController::Mock(pins)),
        ServiceConfig::default(),
    );

    let report = daemon
        .run(async { ShutdownReason::Signal("SIGINT".to_string()) })
        .await;

    assert_eq!(report.exit_code, 1);
    assert!(bus_handle.exported().is_none());
    // Cleanup still drives the outputs low once.
    assert_eq!(pin_handle.issued(), ALL_LOW.to_vec());
    assert_eq!(bus_handle.calls().last(), Some(&BusCall::Close));
}

/// A failing channel during shutdown does not stop the others.
#[tokio::test]
async fn test_shutdown_tolerates_pin_failures() {
    let (bus, _bus_handle) = MockBus::new();
    let (pins, pin_handle) = MockPinController::new();
    let mut daemon = ActuatorDaemon::new(
        bus,
        DigitalOutputs::new(AnyPinController::Mock(pins)),
        ServiceConfig::default(),
    );
    daemon.start().await.unwrap();
    pin_handle.fail_pin(freya_core::Pin::new(16));
    pin_handle.clear();

    let report = daemon
        .shutdown(ShutdownReason::Signal("SIGTERM".to_string()))
        .await;

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.outputs.failed.len(), 1);
    assert_eq!(pin_handle.invocation_count(), 6);
    assert_eq!(daemon.state(), ServiceState::Terminated);
}
