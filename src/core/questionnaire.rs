use crate::core::confidence::{evidence_quantity, sample_offset, ConfidenceModel};
use crate::domain::model::{Answer, BirthRecord, CandidateEstimate, EvidenceTrack};
use crate::domain::ports::Rectifier;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use rand::Rng;

/// Candidate birth-time shift from answered questions.
#[derive(Debug, Clone, Default)]
pub struct QuestionnaireRectifier {
    model: ConfidenceModel,
}

impl QuestionnaireRectifier {
    pub fn new(model: ConfidenceModel) -> Self {
        Self { model }
    }
}

impl Rectifier for QuestionnaireRectifier {
    type Evidence = Answer;

    fn track(&self) -> EvidenceTrack {
        EvidenceTrack::Questionnaire
    }

    fn validate_evidence(&self, _record: &BirthRecord, answers: &[Answer]) -> Result<()> {
        answers.iter().try_for_each(Validate::validate)
    }

    fn rectify<R: Rng + ?Sized>(
        &self,
        record: &BirthRecord,
        answers: &[Answer],
        rng: &mut R,
    ) -> CandidateEstimate {
        let quantity = evidence_quantity(answers);
        let (confidence, max_minutes) = self.model.confidence_and_bound(quantity, self.track());
        let offset = sample_offset(max_minutes, rng);

        tracing::debug!(
            birth = %record.datetime(),
            answers = answers.len(),
            quantity,
            confidence,
            max_minutes,
            offset,
            "questionnaire candidate"
        );

        CandidateEstimate::new(self.track(), offset, confidence)
            .with_evidence(answers.len(), max_minutes)
    }
}
