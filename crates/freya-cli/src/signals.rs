use anyhow::{Context, Result};
use freya_bus::ShutdownReason;
use std::future::Future;

/// Install the stop handlers and return a future resolving on the first one.
///
/// SIGTERM (service manager stop) and SIGINT (Ctrl-C) are treated the same.
/// Handlers are installed before startup so an early signal is not lost.
#[cfg(unix)]
pub fn shutdown_signal() -> Result<impl Future<Output = ShutdownReason>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = terminate.recv() => ShutdownReason::Signal("SIGTERM".to_string()),
            _ = interrupt.recv() => ShutdownReason::Signal("SIGINT".to_string()),
        }
    })
}

#[cfg(not(unix))]
pub fn shutdown_signal() -> Result<impl Future<Output = ShutdownReason>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ShutdownReason::Signal("Ctrl+C".to_string()),
            Err(e) => ShutdownReason::Fatal(format!("unable to listen for shutdown signal: {e}")),
        }
    })
}
