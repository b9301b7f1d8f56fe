use crate::utils::error::{RectifyError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Calibration of one evidence track.
///
/// The shipped defaults are provisional tuning values pending product calibration;
/// deployments are expected to override them from a calibration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackCalibration {
    /// Confidence reported when the track has no evidence at all.
    pub floor_confidence: f64,
    /// Admissible correction window, in minutes, with no evidence.
    pub max_bound_minutes: f64,
    /// Confidence approached as evidence grows. Always below 100.
    pub ceiling_confidence: f64,
    pub growth_rate: f64,
    /// Narrowest window the track ever admits.
    pub bound_floor_minutes: f64,
    pub bound_decay_rate: f64,
}

impl TrackCalibration {
    pub fn questionnaire() -> Self {
        Self {
            floor_confidence: 5.0,
            max_bound_minutes: 30.0,
            ceiling_confidence: 90.0,
            growth_rate: 0.30,
            bound_floor_minutes: 5.0,
            bound_decay_rate: 0.30,
        }
    }

    pub fn life_event() -> Self {
        Self {
            floor_confidence: 5.0,
            max_bound_minutes: 30.0,
            ceiling_confidence: 85.0,
            growth_rate: 0.40,
            bound_floor_minutes: 8.0,
            bound_decay_rate: 0.35,
        }
    }

    pub(crate) fn validate_track(&self, section: &str) -> Result<()> {
        let field = |name: &str| format!("{}.{}", section, name);

        validation::validate_finite_range(&field("floor_confidence"), self.floor_confidence, 0.0, 100.0)?;
        validation::validate_finite_range(
            &field("ceiling_confidence"),
            self.ceiling_confidence,
            self.floor_confidence,
            100.0,
        )?;
        if self.ceiling_confidence >= 100.0 {
            return Err(RectifyError::invalid_input(
                field("ceiling_confidence"),
                self.ceiling_confidence,
                "Ceiling must stay below 100",
            ));
        }
        validation::validate_positive(&field("growth_rate"), self.growth_rate)?;
        validation::validate_positive(&field("max_bound_minutes"), self.max_bound_minutes)?;
        validation::validate_finite_range(
            &field("bound_floor_minutes"),
            self.bound_floor_minutes,
            0.0,
            self.max_bound_minutes,
        )?;
        validation::validate_positive(&field("bound_floor_minutes"), self.bound_floor_minutes)?;
        validation::validate_positive(&field("bound_decay_rate"), self.bound_decay_rate)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinerConfig {
    /// Candidates closer than this, in minutes, corroborate each other.
    pub agreement_threshold_minutes: f64,
    /// Combined confidence never exceeds `100 - certainty_epsilon`.
    pub certainty_epsilon: f64,
    /// Share of the remaining headroom gained when every track agrees, scaled by
    /// the base confidence relative to the ceiling.
    pub corroboration_gain: f64,
    /// Multiplier applied to the combined confidence when tracks disagree.
    pub conflict_retention: f64,
    /// Lowest confidence a conflicting result is cut to. Kept below every track's
    /// `floor_confidence` so a conflict always lowers confidence.
    pub confidence_floor: f64,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            agreement_threshold_minutes: 15.0,
            certainty_epsilon: 1.0,
            corroboration_gain: 0.25,
            conflict_retention: 0.6,
            confidence_floor: 1.0,
        }
    }
}

impl CombinerConfig {
    pub fn confidence_ceiling(&self) -> f64 {
        100.0 - self.certainty_epsilon
    }

    fn validate_combiner(&self) -> Result<()> {
        validation::validate_positive(
            "combiner.agreement_threshold_minutes",
            self.agreement_threshold_minutes,
        )?;
        validation::validate_positive("combiner.certainty_epsilon", self.certainty_epsilon)?;
        validation::validate_finite_range("combiner.certainty_epsilon", self.certainty_epsilon, 0.0, 100.0)?;
        validation::validate_finite_range("combiner.corroboration_gain", self.corroboration_gain, 0.0, 1.0)?;
        validation::validate_positive("combiner.conflict_retention", self.conflict_retention)?;
        if self.conflict_retention >= 1.0 {
            return Err(RectifyError::invalid_input(
                "combiner.conflict_retention",
                self.conflict_retention,
                "Retention must be below 1 so conflicts lower confidence",
            ));
        }
        validation::validate_finite_range(
            "combiner.confidence_floor",
            self.confidence_floor,
            0.0,
            self.confidence_ceiling(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub questionnaire: TrackCalibration,
    pub life_event: TrackCalibration,
    pub combiner: CombinerConfig,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            questionnaire: TrackCalibration::questionnaire(),
            life_event: TrackCalibration::life_event(),
            combiner: CombinerConfig::default(),
        }
    }
}

/// Calibration file layout. Every key is optional and falls back to the track default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub questionnaire: Option<TrackOverrides>,
    pub life_event: Option<TrackOverrides>,
    pub combiner: Option<CombinerOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackOverrides {
    pub floor_confidence: Option<f64>,
    pub max_bound_minutes: Option<f64>,
    pub ceiling_confidence: Option<f64>,
    pub growth_rate: Option<f64>,
    pub bound_floor_minutes: Option<f64>,
    pub bound_decay_rate: Option<f64>,
}

impl TrackOverrides {
    fn apply(&self, base: TrackCalibration) -> TrackCalibration {
        TrackCalibration {
            floor_confidence: self.floor_confidence.unwrap_or(base.floor_confidence),
            max_bound_minutes: self.max_bound_minutes.unwrap_or(base.max_bound_minutes),
            ceiling_confidence: self.ceiling_confidence.unwrap_or(base.ceiling_confidence),
            growth_rate: self.growth_rate.unwrap_or(base.growth_rate),
            bound_floor_minutes: self.bound_floor_minutes.unwrap_or(base.bound_floor_minutes),
            bound_decay_rate: self.bound_decay_rate.unwrap_or(base.bound_decay_rate),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinerOverrides {
    pub agreement_threshold_minutes: Option<f64>,
    pub certainty_epsilon: Option<f64>,
    pub corroboration_gain: Option<f64>,
    pub conflict_retention: Option<f64>,
    pub confidence_floor: Option<f64>,
}

impl CombinerOverrides {
    fn apply(&self, base: CombinerConfig) -> CombinerConfig {
        CombinerConfig {
            agreement_threshold_minutes: self
                .agreement_threshold_minutes
                .unwrap_or(base.agreement_threshold_minutes),
            certainty_epsilon: self.certainty_epsilon.unwrap_or(base.certainty_epsilon),
            corroboration_gain: self.corroboration_gain.unwrap_or(base.corroboration_gain),
            conflict_retention: self.conflict_retention.unwrap_or(base.conflict_retention),
            confidence_floor: self.confidence_floor.unwrap_or(base.confidence_floor),
        }
    }
}

impl CalibrationConfig {
    /// Load calibration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse calibration from TOML, substituting `${VAR}` references from the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let file: CalibrationFile = toml::from_str(&processed_content)?;
        Ok(Self::from_overrides(&file))
    }

    pub fn from_overrides(file: &CalibrationFile) -> Self {
        let defaults = Self::default();
        Self {
            questionnaire: file
                .questionnaire
                .as_ref()
                .map_or(defaults.questionnaire, |o| o.apply(defaults.questionnaire)),
            life_event: file
                .life_event
                .as_ref()
                .map_or(defaults.life_event, |o| o.apply(defaults.life_event)),
            combiner: file
                .combiner
                .as_ref()
                .map_or(defaults.combiner, |o| o.apply(defaults.combiner)),
        }
    }

    // Unset variables are left as written so the TOML parser reports them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RectifyError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl CalibrationConfig {
    fn validate_floor_ordering(&self) -> Result<()> {
        let lowest_track_floor = self
            .questionnaire
            .floor_confidence
            .min(self.life_event.floor_confidence);
        if self.combiner.confidence_floor >= lowest_track_floor {
            return Err(RectifyError::invalid_input(
                "combiner.confidence_floor",
                self.combiner.confidence_floor,
                format!(
                    "Must stay below the lowest track floor_confidence ({})",
                    lowest_track_floor
                ),
            ));
        }
        Ok(())
    }
}

impl Validate for CalibrationConfig {
    fn validate(&self) -> Result<()> {
        self.questionnaire
            .validate_track("questionnaire")
            .and_then(|_| self.life_event.validate_track("life_event"))
            .and_then(|_| self.combiner.validate_combiner())
            .and_then(|_| self.validate_floor_ordering())
            .map_err(RectifyError::into_config_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CalibrationConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.questionnaire.ceiling_confidence < 100.0);
        assert_ne!(config.questionnaire, config.life_event);
    }

    #[test]
    fn test_partial_override_keeps_track_defaults() {
        let config = CalibrationConfig::from_toml_str(
            r#"
[life_event]
ceiling_confidence = 80.0

[combiner]
agreement_threshold_minutes = 10.0
"#,
        )
        .unwrap();

        assert_eq!(config.life_event.ceiling_confidence, 80.0);
        assert_eq!(config.life_event.bound_floor_minutes, 8.0);
        assert_eq!(config.questionnaire, TrackCalibration::questionnaire());
        assert_eq!(config.combiner.agreement_threshold_minutes, 10.0);
        assert_eq!(config.combiner.conflict_retention, 0.6);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RECTIFY_TEST_QUESTIONNAIRE_CEILING", "88.5");

        let config = CalibrationConfig::from_toml_str(
            r#"
[questionnaire]
ceiling_confidence = ${RECTIFY_TEST_QUESTIONNAIRE_CEILING}
"#,
        )
        .unwrap();
        assert_eq!(config.questionnaire.ceiling_confidence, 88.5);

        std::env::remove_var("RECTIFY_TEST_QUESTIONNAIRE_CEILING");
    }

    #[test]
    fn test_ceiling_of_100_is_rejected() {
        let mut config = CalibrationConfig::default();
        config.questionnaire.ceiling_confidence = 100.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RectifyError::ConfigValidationError { ref field, .. } if field == "questionnaire.ceiling_confidence"));
    }

    #[test]
    fn test_bound_floor_must_fit_inside_max_bound() {
        let mut config = CalibrationConfig::default();
        config.life_event.bound_floor_minutes = 45.0;
        assert!(config.validate().is_err());

        config.life_event.bound_floor_minutes = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conflict_retention_must_reduce() {
        let mut config = CalibrationConfig::default();
        config.combiner.conflict_retention = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_combiner_floor_must_sit_below_track_floors() {
        let mut config = CalibrationConfig::default();
        config.combiner.confidence_floor = 5.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RectifyError::ConfigValidationError { ref field, .. } if field == "combiner.confidence_floor"));

        config.combiner.confidence_floor = 4.9;
        assert!(config.validate().is_ok());

        config.life_event.floor_confidence = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = CalibrationConfig::from_toml_str("[questionnaire\nceiling = 1").unwrap_err();
        assert!(matches!(err, RectifyError::TomlError(_)));
    }
}
