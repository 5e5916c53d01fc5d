//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::{AppError, Result},
    executor::{DrainReport, Supervisor},
    logging::LoggerFactory,
};
use std::path::Path;
use std::sync::Arc;

/// File written by `--create-config` and checked by `--debug`
const ENV_FILE: &str = ".env";

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::validation)?;
        Ok(Self { cli })
    }

    /// Handle `--env-help` and `--create-config`.
    ///
    /// Returns true when one of them ran, in which case no load run follows.
    pub fn handle_setup_flags(&self) -> Result<bool> {
        if self.cli.env_help {
            println!("{}", EnvManager::display_env_help());
            return Ok(true);
        }

        if self.cli.create_config {
            let path = Path::new(ENV_FILE);
            if path.exists() {
                return Err(AppError::config(format!(
                    "{} already exists, remove it first",
                    path.display()
                )));
            }

            EnvManager::save_example_env_file(path)?;
            println!("Example configuration written to {}", path.display());
            return Ok(true);
        }

        Ok(false)
    }

    /// Load the configuration, run until interrupted, then drain
    pub async fn run(self) -> Result<DrainReport> {
        if self.cli.debug {
            // Lines shadowed by flags or the environment would otherwise go unnoticed
            if let Some(problems) = EnvManager::check_env_file(Path::new(ENV_FILE))? {
                for problem in problems {
                    eprintln!("{}: {}", ENV_FILE, problem);
                }
            }
        }

        let config = load_config(self.cli)?;
        let warnings = validate_config(&config)?;

        if config.debug {
            println!("{}", crate::build_info());
            println!("\nConfiguration Summary:");
            println!("{}\n", display_config_summary(&config));
        }

        if !warnings.is_empty() {
            eprintln!("Configuration Warnings:");
            for warning in &warnings {
                eprintln!("  {}", warning.format(config.enable_color));
            }
        }

        let run_config = config.to_run_config()?;
        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("POOL");

        logger
            .info(&format!("connecting to {}", run_config.target_url()))
            .field("session_id", factory.session_id())
            .log();

        let handle = Supervisor::new(run_config)
            .with_sink(Arc::new(factory.create_connection_logger()))
            .with_logger(logger.clone())
            .start_run();

        let report = handle.await_interrupt_then_drain().await?;

        if config.verbose {
            println!(
                "Closed {} connections in {:?} ({} panicked)",
                report.workers, report.elapsed, report.panicked
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_color_flags_rejected() {
        let cli = Cli {
            color: true,
            no_color: true,
            ..Default::default()
        };
        let err = App::new(cli).err().unwrap();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_no_setup_flags_means_a_load_run() {
        let app = App::new(Cli::default()).unwrap();
        assert!(!app.handle_setup_flags().unwrap());
    }

    #[test]
    fn test_env_help_is_handled() {
        let cli = Cli {
            env_help: true,
            ..Default::default()
        };
        assert!(App::new(cli).unwrap().handle_setup_flags().unwrap());
    }

    #[tokio::test]
    async fn test_invalid_unit_fails_before_any_connection() {
        let cli = Cli {
            unit: Some("min".to_string()),
            ..Default::default()
        };
        let err = App::new(cli).unwrap().run().await.unwrap_err();
        assert!(err.to_string().contains("invalid unit: min"));
        assert_eq!(err.exit_code(), 1);
    }
}
