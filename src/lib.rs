pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Mode};

pub use config::{CalibrationConfig, RectificationRequest};
pub use crate::core::{
    combiner::EvidenceCombiner,
    confidence::ConfidenceModel,
    engine::{seeded_rng, RectificationEngine},
    life_events::LifeEventRectifier,
    questionnaire::QuestionnaireRectifier,
};
pub use domain::model::{
    Answer, BirthRecord, BirthRecordInput, CandidateEstimate, EvidenceTrack, LifeEvent,
    RectificationResult,
};
pub use domain::ports::Rectifier;
pub use utils::error::{RectifyError, Result};
