//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};
use std::path::PathBuf;

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read a different env file instead of `./.env`
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file_from(&self.env_file, self.cli.debug)?;

        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(ref address) = self.cli.address {
            config.target_url = address.clone();
        }

        if let Some(connections) = self.cli.connections {
            config.connections = connections;
        }

        if let Some(duration) = self.cli.duration {
            config.interval = duration;
        }

        if let Some(ref unit) = self.cli.unit {
            config.interval_unit = unit.clone();
        }

        if let Some(length) = self.cli.length {
            config.payload_length = length;
        }

        if let Some(ref log_format) = self.cli.log_format {
            config.log_format = log_format.parse()?;
        }

        if let Some(enable_color) = self.cli.color_override() {
            config.enable_color = enable_color;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary
pub fn display_config_summary(config: &Config) -> String {
    let summary = [
        format!("Target URL: {}", config.target_url),
        format!("Connections: {}", config.connections),
        format!("Interval: {} {}", config.interval, config.interval_unit),
        format!("Payload Length: {} bytes", config.payload_length),
        format!("Log Format: {:?}", config.log_format),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Tests here touch process-wide environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "TARGET_URL",
        "CONNECTIONS",
        "INTERVAL",
        "INTERVAL_UNIT",
        "PAYLOAD_LENGTH",
        "ENABLE_COLOR",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn parser(args: &[&str], dir: &tempfile::TempDir) -> ConfigParser {
        let mut argv = vec!["wslt"];
        argv.extend_from_slice(args);
        ConfigParser::new(Cli::parse_from(argv)).with_env_file(dir.path().join(".env"))
    }

    #[test]
    fn test_defaults_without_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let config = parser(&[], &dir).parse().unwrap();
        assert_eq!(config.target_url, crate::defaults::DEFAULT_TARGET_URL);
        assert_eq!(config.connections, crate::defaults::DEFAULT_CONNECTIONS);
        assert_eq!(config.interval, crate::defaults::DEFAULT_INTERVAL);
        assert_eq!(config.interval_unit, crate::defaults::DEFAULT_INTERVAL_UNIT);
        assert_eq!(config.payload_length, crate::defaults::DEFAULT_PAYLOAD_LENGTH);
        assert!(!config.verbose);
        assert!(!config.debug);
    }

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let config = parser(
            &[
                "-a",
                "ws://127.0.0.1:9000/",
                "-c",
                "3",
                "-d",
                "100",
                "-u",
                "msec",
                "-l",
                "5",
                "--no-color",
                "--verbose",
            ],
            &dir,
        )
        .parse()
        .unwrap();

        assert_eq!(config.target_url, "ws://127.0.0.1:9000/");
        assert_eq!(config.connections, 3);
        assert_eq!(config.interval, 100);
        assert_eq!(config.interval_unit, "msec");
        assert_eq!(config.payload_length, 5);
        assert!(!config.enable_color);
        assert!(config.verbose);
    }

    #[test]
    fn test_cli_overrides_env_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        env::set_var("CONNECTIONS", "8");
        env::set_var("PAYLOAD_LENGTH", "16");

        let config = parser(&["-c", "12"], &dir).parse().unwrap();
        assert_eq!(config.connections, 12);
        assert_eq!(config.payload_length, 16);

        clear_env();
    }

    #[test]
    fn test_env_file_values_apply() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let mut file = std::fs::File::create(dir.path().join(".env")).unwrap();
        writeln!(file, "INTERVAL=250").unwrap();
        writeln!(file, "INTERVAL_UNIT=msec").unwrap();
        drop(file);

        let config = parser(&[], &dir).parse().unwrap();
        assert_eq!(config.interval, 250);
        assert_eq!(config.interval_unit, "msec");

        clear_env();
    }

    #[test]
    fn test_invalid_cli_values_are_config_errors() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        let cases: [(&[&str], &str); 5] = [
            (&["-u", "min"], "invalid unit: min"),
            (&["-a", "http://host/"], "invalid scheme: http"),
            (&["-c", "0"], "invalid connections: 0"),
            (&["-d", "-2"], "invalid duration: -2"),
            (&["-l", "0"], "invalid length: 0"),
        ];

        for (args, expected) in cases {
            let err = parser(args, &dir).parse().unwrap_err();
            assert!(err.to_string().contains(expected), "{} should contain {}", err, expected);
            assert_eq!(err.exit_code(), 1);
        }
    }

    #[test]
    fn test_invalid_log_format() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        assert!(parser(&["--log-format", "xml"], &dir).parse().is_err());
    }

    #[test]
    fn test_config_summary() {
        let summary = display_config_summary(&Config::default());

        assert!(summary.contains("Target URL: ws://localhost:8000/"));
        assert!(summary.contains("Connections: 1"));
        assert!(summary.contains("Interval: 1 sec"));
        assert!(summary.contains("Payload Length: 1 bytes"));
    }
}
