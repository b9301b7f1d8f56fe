use crate::core::confidence::{evidence_quantity, sample_offset, ConfidenceModel};
use crate::domain::model::{BirthRecord, CandidateEstimate, EvidenceTrack, LifeEvent};
use crate::domain::ports::Rectifier;
use crate::utils::error::{RectifyError, Result};
use crate::utils::validation::Validate;
use rand::Rng;

/// Candidate birth-time shift from biographical life events.
///
/// Shares the shape of [`QuestionnaireRectifier`](crate::core::questionnaire::QuestionnaireRectifier)
/// but reads the life-event calibration, so the two tracks saturate at different levels.
#[derive(Debug, Clone, Default)]
pub struct LifeEventRectifier {
    model: ConfidenceModel,
}

impl LifeEventRectifier {
    pub fn new(model: ConfidenceModel) -> Self {
        Self { model }
    }
}

impl Rectifier for LifeEventRectifier {
    type Evidence = LifeEvent;

    fn track(&self) -> EvidenceTrack {
        EvidenceTrack::LifeEvent
    }

    fn validate_evidence(&self, record: &BirthRecord, events: &[LifeEvent]) -> Result<()> {
        let birth_date = record.datetime().date();
        for event in events {
            event.validate()?;
            if event.date < birth_date {
                return Err(RectifyError::invalid_input(
                    "event.date",
                    event.date,
                    format!("Life event precedes the birth date {}", birth_date),
                ));
            }
        }
        Ok(())
    }

    fn rectify<R: Rng + ?Sized>(
        &self,
        record: &BirthRecord,
        events: &[LifeEvent],
        rng: &mut R,
    ) -> CandidateEstimate {
        let quantity = evidence_quantity(events);
        let (confidence, max_minutes) = self.model.confidence_and_bound(quantity, self.track());
        let offset = sample_offset(max_minutes, rng);

        tracing::debug!(
            birth = %record.datetime(),
            events = events.len(),
            quantity,
            confidence,
            max_minutes,
            offset,
            "life event candidate"
        );

        CandidateEstimate::new(self.track(), offset, confidence)
            .with_evidence(events.len(), max_minutes)
    }
}
