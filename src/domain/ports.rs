use crate::domain::model::{BirthRecord, CandidateEstimate, Evidence, EvidenceTrack};
use crate::utils::error::Result;
use rand::Rng;

/// One evidence track turned into a candidate estimate.
///
/// The random source is passed per call so rectifiers hold no mutable state and
/// can be shared across threads.
pub trait Rectifier: Send + Sync {
    type Evidence: Evidence;

    fn track(&self) -> EvidenceTrack;

    /// Domain checks on the evidence, run once at entry before any rectifier computes.
    fn validate_evidence(&self, record: &BirthRecord, evidence: &[Self::Evidence]) -> Result<()>;

    fn rectify<R: Rng + ?Sized>(
        &self,
        record: &BirthRecord,
        evidence: &[Self::Evidence],
        rng: &mut R,
    ) -> CandidateEstimate;
}
