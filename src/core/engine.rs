use crate::config::calibration::CalibrationConfig;
use crate::core::combiner::EvidenceCombiner;
use crate::core::confidence::ConfidenceModel;
use crate::core::life_events::LifeEventRectifier;
use crate::core::questionnaire::QuestionnaireRectifier;
use crate::domain::model::{Answer, BirthRecord, LifeEvent, RectificationResult};
use crate::domain::ports::Rectifier;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random source for reproducible runs.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Entry points consumed by the API layer.
///
/// Holds only immutable calibration, so one engine can serve concurrent requests;
/// each call brings its own random source.
#[derive(Debug, Clone, Default)]
pub struct RectificationEngine {
    questionnaire: QuestionnaireRectifier,
    life_events: LifeEventRectifier,
    combiner: EvidenceCombiner,
}

impl RectificationEngine {
    pub fn new(config: CalibrationConfig) -> Result<Self> {
        config.validate()?;
        let model = ConfidenceModel::from_config(&config)?;
        Ok(Self {
            questionnaire: QuestionnaireRectifier::new(model),
            life_events: LifeEventRectifier::new(model),
            combiner: EvidenceCombiner::new(config.combiner),
        })
    }

    pub fn rectify_from_questionnaire<R: Rng + ?Sized>(
        &self,
        record: &BirthRecord,
        answers: &[Answer],
        rng: &mut R,
    ) -> Result<RectificationResult> {
        record.validate()?;
        self.questionnaire.validate_evidence(record, answers)?;

        let candidate = self.questionnaire.rectify(record, answers, rng);
        let result = self.combiner.combine(record, &[candidate])?;
        log_result("questionnaire", &result);
        Ok(result)
    }

    pub fn rectify_from_life_events<R: Rng + ?Sized>(
        &self,
        record: &BirthRecord,
        events: &[LifeEvent],
        rng: &mut R,
    ) -> Result<RectificationResult> {
        record.validate()?;
        self.life_events.validate_evidence(record, events)?;

        let candidate = self.life_events.rectify(record, events, rng);
        let result = self.combiner.combine(record, &[candidate])?;
        log_result("life_events", &result);
        Ok(result)
    }

    /// Runs both tracks, questionnaire first, and merges them.
    pub fn rectify_combined<R: Rng + ?Sized>(
        &self,
        record: &BirthRecord,
        answers: &[Answer],
        events: &[LifeEvent],
        rng: &mut R,
    ) -> Result<RectificationResult> {
        record.validate()?;
        self.questionnaire.validate_evidence(record, answers)?;
        self.life_events.validate_evidence(record, events)?;

        let candidates = [
            self.questionnaire.rectify(record, answers, rng),
            self.life_events.rectify(record, events, rng),
        ];
        let result = self.combiner.combine(record, &candidates)?;
        log_result("combined", &result);
        Ok(result)
    }
}

fn log_result(entry: &str, result: &RectificationResult) {
    tracing::info!(
        entry,
        original = %result.original_datetime(),
        rectified = %result.rectified_datetime(),
        adjustment_minutes = result.adjustment_minutes(),
        confidence = result.confidence(),
        evidence = result.evidence_count(),
        conflicting = result.is_conflicting(),
        "✅ rectification complete"
    );
}
