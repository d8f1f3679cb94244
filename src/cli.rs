//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::Level;

use crate::data::{COUNTRIES_OBJECT, WORLD_ATLAS_URL};

#[derive(Debug, Parser)]
#[command(
    name = "tui-globe",
    version,
    about = "Interactive 3D globe of world countries in the terminal",
    long_about = "Spin a Braille-rendered globe of the world's countries.\n\n\
                  Drag to rotate, click a country to see its name."
)]
pub struct Cli {
    /// TopoJSON document to load.
    #[arg(long, value_name = "URL", default_value = WORLD_ATLAS_URL)]
    pub url: String,

    /// Object collection inside the document holding the countries.
    #[arg(long, value_name = "NAME", default_value = COUNTRIES_OBJECT)]
    pub object: String,

    /// HTTP timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Auto-rotation speed (1.0 is one turn per minute).
    #[arg(long = "rotate-speed", value_name = "SPEED", default_value_t = 0.25)]
    pub rotate_speed: f64,

    /// Start with auto-rotation off.
    #[arg(long = "no-rotate")]
    pub no_rotate: bool,

    /// Write logs to this file. Nothing is logged without it.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Default log level (RUST_LOG takes precedence).
    #[arg(long = "log-level", value_enum, default_value = "info")]
    pub log_level: LogLevelArg,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for Level {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Error => Level::ERROR,
            LogLevelArg::Warn => Level::WARN,
            LogLevelArg::Info => Level::INFO,
            LogLevelArg::Debug => Level::DEBUG,
            LogLevelArg::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["tui-globe"]).unwrap();
        assert_eq!(cli.url, WORLD_ATLAS_URL);
        assert_eq!(cli.object, "countries");
        assert_eq!(cli.timeout(), Duration::from_secs(30));
        assert_eq!(cli.rotate_speed, 0.25);
        assert!(!cli.no_rotate);
        assert!(cli.log_file.is_none());
        assert_eq!(Level::from(cli.log_level), Level::INFO);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "tui-globe",
            "--url",
            "http://localhost:8000/land.json",
            "--object",
            "land",
            "--no-rotate",
            "--log-file",
            "globe.log",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.url, "http://localhost:8000/land.json");
        assert_eq!(cli.object, "land");
        assert!(cli.no_rotate);
        assert_eq!(cli.log_file, Some(PathBuf::from("globe.log")));
        assert_eq!(cli.log_level, LogLevelArg::Debug);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["tui-globe", "--log-level", "loud"]).is_err());
    }
}
