use crate::utils::error::{RectifyError, Result};
use crate::utils::validation::{self, Validate};
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Birth record as it arrives from the caller, before domain checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthRecordInput {
    pub datetime: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// A validated birth record. Only constructible through checks, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BirthRecordInput")]
pub struct BirthRecord {
    datetime: NaiveDateTime,
    latitude: f64,
    longitude: f64,
    timezone: Tz,
}

impl BirthRecord {
    pub fn new(datetime: NaiveDateTime, latitude: f64, longitude: f64, timezone: &str) -> Result<Self> {
        let timezone = validation::validate_timezone("timezone", timezone)?;
        let record = Self {
            datetime,
            latitude,
            longitude,
            timezone,
        };
        record.validate()?;
        Ok(record)
    }

    /// Builds a record from a textual local datetime such as `1990-05-14T06:30:00`.
    pub fn parse(datetime: &str, latitude: f64, longitude: f64, timezone: &str) -> Result<Self> {
        Self::new(parse_local_datetime(datetime)?, latitude, longitude, timezone)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// The birth instant. A local time repeated by a DST fold resolves to the earlier instant.
    pub fn utc_datetime(&self) -> Result<DateTime<Utc>> {
        resolve_local(self.timezone, self.datetime).map(|dt| dt.with_timezone(&Utc))
    }
}

impl Validate for BirthRecord {
    fn validate(&self) -> Result<()> {
        validation::validate_latitude(self.latitude)?;
        validation::validate_longitude(self.longitude)?;
        resolve_local(self.timezone, self.datetime)?;
        Ok(())
    }
}

impl TryFrom<BirthRecordInput> for BirthRecord {
    type Error = RectifyError;

    fn try_from(input: BirthRecordInput) -> Result<Self> {
        Self::parse(&input.datetime, input.latitude, input.longitude, &input.timezone)
    }
}

pub fn parse_local_datetime(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| {
            RectifyError::invalid_input(
                "datetime",
                value,
                "Malformed date-time, expected YYYY-MM-DDTHH:MM[:SS]",
            )
        })
}

fn resolve_local(timezone: Tz, datetime: NaiveDateTime) -> Result<DateTime<Tz>> {
    match timezone.from_local_datetime(&datetime) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(RectifyError::invalid_input(
            "datetime",
            datetime,
            format!("Local time does not exist in {}", timezone.name()),
        )),
    }
}

/// Shifts a local time by signed minutes, truncated toward zero at millisecond precision.
pub(crate) fn shift_by_minutes(datetime: NaiveDateTime, minutes: f64) -> Result<NaiveDateTime> {
    let millis = (minutes * 60_000.0).trunc() as i64;
    datetime
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(|| {
            RectifyError::invalid_input("datetime", datetime, "Adjusted time is out of range")
        })
}

/// Weighted evidence item.
pub trait Evidence {
    fn weight(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            question_id: question_id.into(),
            value: value.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl Evidence for Answer {
    fn weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

impl Validate for Answer {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("answer.question_id", &self.question_id)?;
        validation::validate_non_negative("answer.weight", self.weight())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub date: NaiveDate,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl LifeEvent {
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date,
            description: description.into(),
            category: None,
            weight: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl Evidence for LifeEvent {
    fn weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

impl Validate for LifeEvent {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("event.description", &self.description)?;
        validation::validate_non_negative("event.weight", self.weight())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceTrack {
    Questionnaire,
    LifeEvent,
}

impl EvidenceTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceTrack::Questionnaire => "questionnaire",
            EvidenceTrack::LifeEvent => "life_event",
        }
    }
}

impl fmt::Display for EvidenceTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a single evidence track, consumed by the combiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEstimate {
    pub adjustment_minutes: f64,
    pub confidence: f64,
    pub track: EvidenceTrack,
    pub evidence_count: usize,
    /// Admissible |adjustment| for the evidence that produced this candidate.
    pub bound_minutes: f64,
}

impl CandidateEstimate {
    /// A bare candidate whose bound is its own magnitude; see `with_evidence`.
    pub fn new(track: EvidenceTrack, adjustment_minutes: f64, confidence: f64) -> Self {
        Self {
            adjustment_minutes,
            confidence,
            track,
            evidence_count: 0,
            bound_minutes: adjustment_minutes.abs(),
        }
    }

    pub fn with_evidence(mut self, evidence_count: usize, bound_minutes: f64) -> Self {
        self.evidence_count = evidence_count;
        self.bound_minutes = bound_minutes;
        self
    }
}

impl Validate for CandidateEstimate {
    fn validate(&self) -> Result<()> {
        validation::validate_finite("candidate.adjustment_minutes", self.adjustment_minutes)?;
        validation::validate_finite_range("candidate.confidence", self.confidence, 0.0, 100.0)?;
        validation::validate_non_negative("candidate.bound_minutes", self.bound_minutes)?;
        if self.adjustment_minutes.abs() > self.bound_minutes {
            return Err(RectifyError::invalid_input(
                "candidate.adjustment_minutes",
                self.adjustment_minutes,
                format!("Exceeds the candidate bound of {} minutes", self.bound_minutes),
            ));
        }
        Ok(())
    }
}

/// Final answer handed back to the API layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectificationResult {
    original_datetime: NaiveDateTime,
    rectified_datetime: NaiveDateTime,
    timezone: Tz,
    confidence: f64,
    evidence_count: usize,
    adjustment_minutes: f64,
    bound_minutes: f64,
    conflicting: bool,
    sources: Vec<EvidenceTrack>,
}

impl RectificationResult {
    pub(crate) fn new(
        record: &BirthRecord,
        adjustment_minutes: f64,
        confidence: f64,
        evidence_count: usize,
        bound_minutes: f64,
        conflicting: bool,
        sources: Vec<EvidenceTrack>,
    ) -> Result<Self> {
        Ok(Self {
            original_datetime: record.datetime(),
            rectified_datetime: shift_by_minutes(record.datetime(), adjustment_minutes)?,
            timezone: record.timezone(),
            confidence,
            evidence_count,
            adjustment_minutes,
            bound_minutes,
            conflicting,
            sources,
        })
    }

    pub fn original_datetime(&self) -> NaiveDateTime {
        self.original_datetime
    }

    pub fn rectified_datetime(&self) -> NaiveDateTime {
        self.rectified_datetime
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence_count
    }

    /// Signed shift relative to the original birth time.
    pub fn adjustment_minutes(&self) -> f64 {
        self.adjustment_minutes
    }

    pub fn bound_minutes(&self) -> f64 {
        self.bound_minutes
    }

    /// Set when evidence tracks disagreed beyond the agreement threshold.
    pub fn is_conflicting(&self) -> bool {
        self.conflicting
    }

    pub fn sources(&self) -> &[EvidenceTrack] {
        &self.sources
    }
}
