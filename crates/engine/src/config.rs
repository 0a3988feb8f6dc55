//! TOML run configuration.
//!
//! A config names the sources to load (with their column mappings), an
//! optional attendance signal log, and the matching knobs. Parsing and
//! validation are separate so the CLI can report semantic problems with
//! their own exit code.

use serde::Deserialize;

use crate::error::RosterError;
use crate::model::SourceKind;

/// Top-level run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    /// Human label for this run, echoed into result metadata.
    pub name: String,
    /// Sources in arrival order. Order is load-bearing: it fixes every
    /// deterministic tie-break downstream.
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub signals: Option<SignalConfig>,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// One participant source and how to read it.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Unique tag, used in provenance fields and error messages.
    pub tag: String,
    pub kind: SourceKind,
    /// CSV path, resolved relative to the config file by the caller.
    pub file: String,
    pub columns: ColumnMapping,
}

/// Maps roster fields to CSV header names for one source.
///
/// Only name and program are mandatory; everything else defaults to the
/// empty string when unmapped.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub full_name: String,
    pub program: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub rsvp: Option<String>,
    #[serde(default)]
    pub attendance: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Attendance signal log and how to read it.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    pub file: String,
    pub columns: SignalColumnMapping,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalColumnMapping {
    /// Header carrying the event name the check-in was logged under.
    pub event: String,
    #[serde(default)]
    pub occurred_at: Option<String>,
}

/// Matching knobs. Defaults match the production tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Token-overlap ratio at or above which two titles are similar.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Title segments at or below this length are never picked as the
    /// meaningful segment.
    #[serde(default = "default_min_segment_len")]
    pub min_segment_len: usize,
    /// Distinct exact-word overlaps required to join a signal event to a
    /// program group.
    #[serde(default = "default_signal_overlap_words")]
    pub signal_overlap_words: usize,
    /// Year assumed for date fragments like "14 May" that carry none.
    #[serde(default = "default_assumed_year")]
    pub assumed_year: i32,
    /// Offset applied when shifting embedded UTC timestamps to event
    /// local time.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i64,
}

fn default_similarity_threshold() -> f64 {
    0.8
}

fn default_min_segment_len() -> usize {
    10
}

fn default_signal_overlap_words() -> usize {
    2
}

fn default_assumed_year() -> i32 {
    2025
}

fn default_utc_offset_hours() -> i64 {
    8
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            similarity_threshold: default_similarity_threshold(),
            min_segment_len: default_min_segment_len(),
            signal_overlap_words: default_signal_overlap_words(),
            assumed_year: default_assumed_year(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

/// Where to write the result document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// JSON output path; stdout when unset.
    #[serde(default)]
    pub json: Option<String>,
}

impl RosterConfig {
    /// Parse a config from TOML text and validate it.
    pub fn from_toml(input: &str) -> Result<Self, RosterError> {
        let config: RosterConfig =
            toml::from_str(input).map_err(|e| RosterError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks beyond what the TOML shape enforces.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.sources.is_empty() {
            return Err(RosterError::ConfigValidation(
                "at least one source is required".into(),
            ));
        }
        if !self
            .sources
            .iter()
            .any(|s| s.kind == SourceKind::Primary)
        {
            return Err(RosterError::ConfigValidation(
                "at least one primary source is required".into(),
            ));
        }
        for (i, source) in self.sources.iter().enumerate() {
            if source.tag.trim().is_empty() {
                return Err(RosterError::ConfigValidation(format!(
                    "source #{} has an empty tag",
                    i + 1
                )));
            }
            if self.sources[..i].iter().any(|s| s.tag == source.tag) {
                return Err(RosterError::ConfigValidation(format!(
                    "duplicate source tag '{}'",
                    source.tag
                )));
            }
        }
        let m = &self.matching;
        if !(m.similarity_threshold > 0.0 && m.similarity_threshold <= 1.0) {
            return Err(RosterError::ConfigValidation(format!(
                "similarity_threshold must be in (0, 1], got {}",
                m.similarity_threshold
            )));
        }
        if m.signal_overlap_words == 0 {
            return Err(RosterError::ConfigValidation(
                "signal_overlap_words must be at least 1".into(),
            ));
        }
        if m.min_segment_len == 0 {
            return Err(RosterError::ConfigValidation(
                "min_segment_len must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
