pub mod calibration;
pub mod request;

pub use calibration::{CalibrationConfig, CombinerConfig, TrackCalibration};
pub use request::RectificationRequest;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

/// Which evidence tracks a CLI run evaluates.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Questionnaire,
    LifeEvents,
    Combined,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "rectify")]
#[command(about = "Refine an approximate birth time from questionnaire answers and life events")]
pub struct CliConfig {
    /// Request file (TOML, or JSON when the extension is .json)
    #[arg(short, long)]
    pub request: String,

    /// Calibration TOML file; built-in defaults when omitted
    #[arg(short, long)]
    pub calibration: Option<String>,

    #[arg(short, long, value_enum, default_value = "combined")]
    pub mode: Mode,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("request", &self.request)?;
        if let Some(calibration) = &self.calibration {
            validation::validate_non_empty_string("calibration", calibration)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_arguments() {
        let config = CliConfig::parse_from([
            "rectify",
            "--request",
            "birth.toml",
            "--mode",
            "life-events",
            "--seed",
            "42",
        ]);
        assert_eq!(config.mode, Mode::LifeEvents);
        assert_eq!(config.seed, Some(42));
        assert!(config.calibration.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_defaults_to_combined() {
        let config = CliConfig::parse_from(["rectify", "-r", "birth.json"]);
        assert_eq!(config.mode, Mode::Combined);
    }
}
