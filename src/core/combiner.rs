//! Merges per-track candidates into one result.
//!
//! The merged adjustment is the confidence-weighted mean of the candidate
//! adjustments. The base confidence is the confidence-weighted mean of the
//! candidate confidences (`sum(c^2) / sum(c)`). When every pair of candidates
//! lies within the agreement threshold the base is raised toward the global
//! ceiling, in proportion to how trusted it already is. Otherwise it is scaled
//! down and the result is flagged as conflicting.
//! A single candidate passes through untouched.

use crate::config::calibration::CombinerConfig;
use crate::domain::model::{BirthRecord, CandidateEstimate, EvidenceTrack, RectificationResult};
use crate::utils::error::{RectifyError, Result};
use crate::utils::validation::Validate;

/// Combined estimate before it is applied to a birth record.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedEstimate {
    pub adjustment_minutes: f64,
    pub confidence: f64,
    pub conflicting: bool,
    pub evidence_count: usize,
    pub bound_minutes: f64,
    pub sources: Vec<EvidenceTrack>,
}

#[derive(Debug, Clone, Default)]
pub struct EvidenceCombiner {
    config: CombinerConfig,
}

impl EvidenceCombiner {
    pub fn new(config: CombinerConfig) -> Self {
        Self { config }
    }

    pub fn combine(
        &self,
        record: &BirthRecord,
        candidates: &[CandidateEstimate],
    ) -> Result<RectificationResult> {
        let merged = self.merge(candidates)?;
        RectificationResult::new(
            record,
            merged.adjustment_minutes,
            merged.confidence,
            merged.evidence_count,
            merged.bound_minutes,
            merged.conflicting,
            merged.sources,
        )
    }

    pub fn merge(&self, candidates: &[CandidateEstimate]) -> Result<MergedEstimate> {
        if candidates.is_empty() {
            return Err(RectifyError::NoCandidates);
        }
        candidates.iter().try_for_each(Validate::validate)?;

        let evidence_count = candidates.iter().map(|c| c.evidence_count).sum();
        let bound_minutes = candidates
            .iter()
            .map(|c| c.bound_minutes)
            .fold(0.0, f64::max);
        let sources = candidates.iter().map(|c| c.track).collect();

        if let [only] = candidates {
            return Ok(MergedEstimate {
                adjustment_minutes: only.adjustment_minutes,
                confidence: only.confidence,
                conflicting: false,
                evidence_count,
                bound_minutes,
                sources,
            });
        }

        let adjustment_minutes = weighted_adjustment(candidates);
        let base = weighted_confidence(candidates);
        let spread = adjustment_spread(candidates);
        let conflicting = spread >= self.config.agreement_threshold_minutes;

        let confidence = if conflicting {
            let scaled = base * self.config.conflict_retention;
            let reduced = if base > self.config.confidence_floor {
                scaled.max(self.config.confidence_floor)
            } else {
                scaled
            };
            tracing::warn!(
                spread,
                threshold = self.config.agreement_threshold_minutes,
                base,
                reduced,
                "⚠️ evidence tracks disagree"
            );
            reduced
        } else {
            let ceiling = self.config.confidence_ceiling();
            // weak tracks that agree gain little
            let headroom = (ceiling - base).max(0.0);
            let trust = (base / ceiling).min(1.0);
            (base + headroom * self.config.corroboration_gain * trust).min(ceiling)
        };

        tracing::debug!(
            candidates = candidates.len(),
            adjustment_minutes,
            base,
            confidence,
            conflicting,
            "merged candidates"
        );

        Ok(MergedEstimate {
            adjustment_minutes,
            confidence,
            conflicting,
            evidence_count,
            bound_minutes,
            sources,
        })
    }
}

/// `sum(c * a) / sum(c)`, or the plain mean when every confidence is zero.
fn weighted_adjustment(candidates: &[CandidateEstimate]) -> f64 {
    let total: f64 = candidates.iter().map(|c| c.confidence).sum();
    if total > 0.0 {
        candidates
            .iter()
            .map(|c| c.confidence * c.adjustment_minutes)
            .sum::<f64>()
            / total
    } else {
        candidates.iter().map(|c| c.adjustment_minutes).sum::<f64>() / candidates.len() as f64
    }
}

fn weighted_confidence(candidates: &[CandidateEstimate]) -> f64 {
    let total: f64 = candidates.iter().map(|c| c.confidence).sum();
    if total > 0.0 {
        candidates.iter().map(|c| c.confidence * c.confidence).sum::<f64>() / total
    } else {
        0.0
    }
}

/// Largest pairwise difference between adjustments.
fn adjustment_spread(candidates: &[CandidateEstimate]) -> f64 {
    let (min, max) = candidates.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c.adjustment_minutes), hi.max(c.adjustment_minutes))
    });
    max - min
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(track: EvidenceTrack, adjustment: f64, confidence: f64) -> CandidateEstimate {
        CandidateEstimate::new(track, adjustment, confidence).with_evidence(4, 60.0)
    }

    #[test]
    fn test_empty_is_rejected() {
        let combiner = EvidenceCombiner::default();
        assert!(matches!(combiner.merge(&[]), Err(RectifyError::NoCandidates)));
    }

    #[test]
    fn test_single_candidate_passes_through() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[candidate(EvidenceTrack::Questionnaire, -7.25, 42.0)])
            .unwrap();
        assert_eq!(merged.adjustment_minutes, -7.25);
        assert_eq!(merged.confidence, 42.0);
        assert!(!merged.conflicting);
        assert_eq!(merged.sources, vec![EvidenceTrack::Questionnaire]);
    }

    #[test]
    fn test_agreeing_candidates_are_boosted() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                candidate(EvidenceTrack::Questionnaire, 10.0, 80.0),
                candidate(EvidenceTrack::LifeEvent, 12.0, 70.0),
            ])
            .unwrap();

        let expected = (80.0 * 10.0 + 70.0 * 12.0) / 150.0;
        assert!((merged.adjustment_minutes - expected).abs() < 1e-9);
        assert!(merged.confidence >= 75.0);
        assert!(merged.confidence <= 99.0);
        assert!(!merged.conflicting);
        assert_eq!(merged.evidence_count, 8);
    }

    #[test]
    fn test_disagreeing_candidates_are_penalised() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                candidate(EvidenceTrack::Questionnaire, 60.0, 80.0),
                candidate(EvidenceTrack::LifeEvent, -60.0, 70.0),
            ])
            .unwrap();

        let plain = (80.0 + 70.0) / 2.0;
        assert!(merged.confidence < plain);
        assert!(merged.conflicting);
    }

    #[test]
    fn test_spread_equal_to_threshold_is_a_conflict() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                candidate(EvidenceTrack::Questionnaire, 0.0, 50.0),
                candidate(EvidenceTrack::LifeEvent, 15.0, 50.0),
            ])
            .unwrap();
        assert!(merged.conflicting);
    }

    #[test]
    fn test_boost_never_reaches_certainty() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                candidate(EvidenceTrack::Questionnaire, 1.0, 99.5),
                candidate(EvidenceTrack::LifeEvent, 1.0, 100.0),
            ])
            .unwrap();
        assert_eq!(merged.confidence, 99.0);
    }

    #[test]
    fn test_conflict_respects_floor() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                candidate(EvidenceTrack::Questionnaire, 30.0, 1.5),
                candidate(EvidenceTrack::LifeEvent, -30.0, 1.5),
            ])
            .unwrap();
        assert_eq!(merged.confidence, 1.0);
        assert!(merged.conflicting);
    }

    #[test]
    fn test_conflict_between_floor_level_tracks_still_lowers_confidence() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                CandidateEstimate::new(EvidenceTrack::Questionnaire, 20.0, 5.0).with_evidence(0, 30.0),
                CandidateEstimate::new(EvidenceTrack::LifeEvent, -20.0, 5.0).with_evidence(0, 30.0),
            ])
            .unwrap();
        assert!(merged.conflicting);
        assert!(merged.confidence < 5.0);
        assert!(merged.confidence >= 1.0);
    }

    #[test]
    fn test_conflict_below_floor_is_still_scaled_down() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                candidate(EvidenceTrack::Questionnaire, 30.0, 0.5),
                candidate(EvidenceTrack::LifeEvent, -30.0, 0.5),
            ])
            .unwrap();
        assert!(merged.conflicting);
        assert!(merged.confidence < 0.5);
    }

    #[test]
    fn test_zero_confidence_falls_back_to_plain_mean() {
        let combiner = EvidenceCombiner::default();
        let merged = combiner
            .merge(&[
                candidate(EvidenceTrack::Questionnaire, 4.0, 0.0),
                candidate(EvidenceTrack::LifeEvent, 8.0, 0.0),
            ])
            .unwrap();
        assert_eq!(merged.adjustment_minutes, 6.0);
        assert_eq!(merged.confidence, 0.0);
    }

    #[test]
    fn test_invalid_candidate_is_rejected() {
        let combiner = EvidenceCombiner::default();
        let result = combiner.merge(&[
            candidate(EvidenceTrack::Questionnaire, 1.0, 50.0),
            candidate(EvidenceTrack::LifeEvent, 1.0, 150.0),
        ]);
        assert!(result.unwrap_err().is_invalid_input());
    }
}
