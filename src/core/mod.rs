pub mod combiner;
pub mod confidence;
pub mod engine;
pub mod life_events;
pub mod questionnaire;

pub use crate::domain::model::{
    Answer, BirthRecord, CandidateEstimate, EvidenceTrack, LifeEvent, RectificationResult,
};
pub use crate::domain::ports::Rectifier;
pub use crate::utils::error::Result;
