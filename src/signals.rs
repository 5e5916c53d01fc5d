//! OS interrupt delivery for the run's drain
//!
//! On Unix both SIGINT (Ctrl-C) and SIGTERM end the wait; elsewhere only
//! Ctrl-C does.

use crate::error::{AppError, Result};

/// Completes when the process receives an interrupt or termination signal
#[cfg(unix)]
pub async fn wait_for_interrupt() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).map_err(registration_error)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(registration_error)?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

/// Completes when the process receives Ctrl-C
#[cfg(not(unix))]
pub async fn wait_for_interrupt() -> Result<()> {
    tokio::signal::ctrl_c().await.map_err(registration_error)
}

fn registration_error(error: std::io::Error) -> AppError {
    AppError::io(format!("failed to listen for interrupt signals: {}", error))
}
