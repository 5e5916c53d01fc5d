//! WebSocket Load Tester - Main CLI Application
//!
//! Opens many persistent WebSocket connections against one endpoint, logs the
//! round-trip time of every periodic exchange, and closes every connection
//! cleanly on Ctrl-C.

use clap::Parser;
use std::error::Error;
use std::process;
use ws_load_tester::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter},
};

#[tokio::main]
async fn main() {
    // Worker panics are contained by their tasks; just make them visible
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<(), AppError> {
    let app = App::new(cli)?;
    if app.handle_setup_flags()? {
        return Ok(());
    }

    app.run().await?;
    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - The address must start with ws:// or wss://");
            eprintln!("  - Connections, duration and length must be greater than 0");
            eprintln!("  - The unit must be msec or sec");
            eprintln!("  - Check your .env file and environment variables");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("Signal handling help:");
            eprintln!("  - The run was drained without waiting for an interrupt");
            eprintln!("  - Check that the process may install signal handlers");
        }
        _ => {}
    }
}
