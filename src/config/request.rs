use crate::domain::model::{Answer, BirthRecord, BirthRecordInput, LifeEvent};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A rectification request as read from disk: the raw birth record plus evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectificationRequest {
    pub birth: BirthRecordInput,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub events: Vec<LifeEvent>,
}

impl RectificationRequest {
    /// `.json` files are read as JSON, anything else as TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn birth_record(&self) -> Result<BirthRecord> {
        BirthRecord::try_from(self.birth.clone())
    }
}
