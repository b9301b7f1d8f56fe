//! Evidence quantity to trust score and correction window.
//!
//! Each track follows two saturating curves over the evidence quantity `q`:
//!
//! ```text
//! confidence(q) = ceiling - (ceiling - floor) * e^(-growth * q)
//! bound(q)      = bound_floor + (max_bound - bound_floor) * e^(-decay * q)
//! ```
//!
//! At `q = 0` they return the track's floor confidence and widest window exactly.
//! Confidence rises toward the ceiling and the window narrows toward its floor
//! without ever reaching either.

use crate::config::calibration::{CalibrationConfig, TrackCalibration};
use crate::domain::model::{Evidence, EvidenceTrack};
use crate::utils::error::{RectifyError, Result};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceModel {
    questionnaire: TrackCalibration,
    life_event: TrackCalibration,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        let config = CalibrationConfig::default();
        Self {
            questionnaire: config.questionnaire,
            life_event: config.life_event,
        }
    }
}

impl ConfidenceModel {
    pub fn new(questionnaire: TrackCalibration, life_event: TrackCalibration) -> Result<Self> {
        questionnaire
            .validate_track("questionnaire")
            .and_then(|_| life_event.validate_track("life_event"))
            .map_err(RectifyError::into_config_error)?;
        Ok(Self {
            questionnaire,
            life_event,
        })
    }

    pub fn from_config(config: &CalibrationConfig) -> Result<Self> {
        Self::new(config.questionnaire, config.life_event)
    }

    pub fn calibration(&self, track: EvidenceTrack) -> &TrackCalibration {
        match track {
            EvidenceTrack::Questionnaire => &self.questionnaire,
            EvidenceTrack::LifeEvent => &self.life_event,
        }
    }

    /// Returns `(confidence, max_minutes)` for `evidence` on `track`.
    ///
    /// Negative or NaN quantities are treated as no evidence.
    pub fn confidence_and_bound(&self, evidence: f64, track: EvidenceTrack) -> (f64, f64) {
        let calibration = self.calibration(track);
        let quantity = evidence.max(0.0);

        if quantity == 0.0 {
            return (calibration.floor_confidence, calibration.max_bound_minutes);
        }

        let confidence = calibration.ceiling_confidence
            - (calibration.ceiling_confidence - calibration.floor_confidence)
                * (-calibration.growth_rate * quantity).exp();
        let max_minutes = calibration.bound_floor_minutes
            + (calibration.max_bound_minutes - calibration.bound_floor_minutes)
                * (-calibration.bound_decay_rate * quantity).exp();

        (confidence, max_minutes)
    }
}

/// Total weight of an evidence collection.
pub fn evidence_quantity<E: Evidence>(items: &[E]) -> f64 {
    items.iter().map(Evidence::weight).sum()
}

/// Uniform signed offset in `[-max_minutes, +max_minutes]`.
///
/// A window that is not a positive finite number yields no shift.
pub fn sample_offset<R: Rng + ?Sized>(max_minutes: f64, rng: &mut R) -> f64 {
    if !(max_minutes > 0.0 && max_minutes.is_finite()) {
        return 0.0;
    }
    rng.random_range(-max_minutes..=max_minutes)
}
