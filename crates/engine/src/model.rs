//! Data model for roster reconciliation.
//!
//! Inputs are pre-loaded (`RosterInput`), outputs are a single serializable
//! document (`RosterResult`). All maps are `BTreeMap` so serialized output
//! is byte-stable across runs.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::identity::IdentityKey;

// ---------------------------------------------------------------------------
// Input side
// ---------------------------------------------------------------------------

/// Which merge tier a source belongs to.
///
/// Primary sources are unioned verbatim; secondary sources only contribute
/// records whose identity does not collide with a primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Primary,
    Secondary,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Primary => write!(f, "primary"),
            SourceKind::Secondary => write!(f, "secondary"),
        }
    }
}

/// One flattened row from one source, after column mapping.
///
/// Every field is already trimmed; absent columns map to empty strings.
/// Status fields are parsed totally at load time, so a `RawRecord` never
/// carries an unparseable status.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub program_raw: String,
    pub datetime_raw: String,
    pub rsvp: RsvpStatus,
    pub attendance: AttendanceStatus,
    pub profession: String,
    pub category: String,
}

/// All records loaded from a single source, tagged with its config identity.
#[derive(Debug, Clone)]
pub struct SourceRecords {
    pub tag: String,
    pub kind: SourceKind,
    pub records: Vec<RawRecord>,
}

/// One identity-less check-in event from an attendance log.
///
/// Carries only the event name it was logged under and when it happened.
#[derive(Debug, Clone)]
pub struct SignalEvent {
    pub event_name: String,
    pub occurred_at: NaiveDateTime,
}

/// Pre-loaded input for one reconciliation run.
///
/// Source order is significant: it fixes arrival order for every
/// deterministic tie-break downstream.
#[derive(Debug, Clone, Default)]
pub struct RosterInput {
    pub sources: Vec<SourceRecords>,
    pub signals: Vec<SignalEvent>,
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Registration intent as declared by the participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Accepted,
    Pending,
    #[default]
    Unspecified,
}

impl RsvpStatus {
    /// Total parse of a raw spreadsheet cell. Unknown text degrades to
    /// `Unspecified`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "accepted" | "accept" | "yes" | "going" | "confirmed" => RsvpStatus::Accepted,
            "pending" | "maybe" | "invited" | "waitlist" | "waitlisted" => RsvpStatus::Pending,
            _ => RsvpStatus::Unspecified,
        }
    }

    /// Strict parse of a canonical label, for filter expressions.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "accepted" => Some(RsvpStatus::Accepted),
            "pending" => Some(RsvpStatus::Pending),
            "unspecified" => Some(RsvpStatus::Unspecified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Accepted => "accepted",
            RsvpStatus::Pending => "pending",
            RsvpStatus::Unspecified => "unspecified",
        }
    }
}

/// Attendance as recorded by the source itself, before reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Accepted,
    NotAttended,
    Pending,
    #[default]
    Unspecified,
}

impl AttendanceStatus {
    /// Total parse of a raw spreadsheet cell. Unknown text degrades to
    /// `Unspecified`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "accepted" | "attended" | "present" | "checked in" | "checked-in" | "yes" => {
                AttendanceStatus::Accepted
            }
            "not attended" | "not_attended" | "absent" | "no show" | "no-show" | "no" => {
                AttendanceStatus::NotAttended
            }
            "pending" | "registered" | "maybe" => AttendanceStatus::Pending,
            _ => AttendanceStatus::Unspecified,
        }
    }

    /// Rank for headcount slot allocation. Lower ranks are granted slots
    /// first; explicit `Accepted` never competes for a slot.
    pub fn slot_priority(&self) -> u8 {
        match self {
            AttendanceStatus::Pending => 0,
            AttendanceStatus::NotAttended => 1,
            AttendanceStatus::Unspecified => 2,
            AttendanceStatus::Accepted => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Accepted => "accepted",
            AttendanceStatus::NotAttended => "not_attended",
            AttendanceStatus::Pending => "pending",
            AttendanceStatus::Unspecified => "unspecified",
        }
    }
}

/// Final per-participant verdict after explicit marks and headcount signals
/// are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciledStatus {
    Attended,
    NotAttended,
    Pending,
    #[default]
    Unknown,
}

impl ReconciledStatus {
    /// Strict parse of a canonical label, for filter expressions.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "attended" => Some(ReconciledStatus::Attended),
            "not_attended" | "not attended" => Some(ReconciledStatus::NotAttended),
            "pending" => Some(ReconciledStatus::Pending),
            "unknown" => Some(ReconciledStatus::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciledStatus::Attended => "attended",
            ReconciledStatus::NotAttended => "not_attended",
            ReconciledStatus::Pending => "pending",
            ReconciledStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReconciledStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output side
// ---------------------------------------------------------------------------

/// A merged, deduplicated record with every derived field attached.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// Program title exactly as the source wrote it.
    pub program_raw: String,
    /// Cleaned program title ("Unspecified" when nothing survives cleaning).
    pub program: String,
    /// Resolved event instant. Unresolvable inputs share the epoch sentinel.
    pub event_at: NaiveDateTime,
    pub rsvp: RsvpStatus,
    /// Attendance as the source recorded it, before reconciliation.
    pub attendance: AttendanceStatus,
    /// Reconciled verdict.
    pub status: ReconciledStatus,
    pub profession: String,
    pub category: String,
    /// Tag of the source this record arrived from.
    pub source: String,
    /// Index into `RosterResult::programs`.
    pub group: usize,
    /// Normalized contact identity used for dedup and joins.
    pub identity: IdentityKey,
}

/// One reconciled program session.
///
/// `member_names` keeps every distinct raw title variant folded into the
/// group, in insertion order; `canonical_name` is the display join over
/// them.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramGroup {
    pub canonical_name: String,
    /// Instant of the record that created the group.
    pub representative_datetime: NaiveDateTime,
    pub member_names: Vec<String>,
    /// Distinct source tags that contributed members, in insertion order.
    pub origin_sources: Vec<String>,
    /// Single source tag, or "Multiple Sources".
    pub origin_label: String,
}

/// Deterministic roll-up counts over the reconciled roster.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Breakdowns {
    pub by_program: BTreeMap<String, usize>,
    pub by_profession: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

/// Run-level counters surfaced next to the roster.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RosterSummary {
    pub participants: usize,
    pub programs: usize,
    pub attended: usize,
    pub not_attended: usize,
    pub pending: usize,
    pub unknown: usize,
    /// Secondary records excluded because a primary already owned the
    /// same email or phone.
    pub duplicates_skipped: usize,
    /// Rows dropped at merge time as unusable.
    pub records_dropped: usize,
    pub signal_events: usize,
    /// Signal events that matched no program group.
    pub unmatched_signals: usize,
    /// Headcount slots no candidate was available to fill.
    pub unallocated_slots: usize,
    pub status_counts: BTreeMap<String, usize>,
}

/// Provenance block for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RosterMeta {
    pub config_name: String,
    pub sources: usize,
    pub engine_version: String,
    pub run_at: String,
}

/// Complete output document for one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct RosterResult {
    pub meta: RosterMeta,
    pub summary: RosterSummary,
    pub participants: Vec<Participant>,
    pub programs: Vec<ProgramGroup>,
    pub breakdowns: Breakdowns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsvp_raw_parse_is_total() {
        assert_eq!(RsvpStatus::from_raw("Going"), RsvpStatus::Accepted);
        assert_eq!(RsvpStatus::from_raw("  waitlist "), RsvpStatus::Pending);
        assert_eq!(RsvpStatus::from_raw("???"), RsvpStatus::Unspecified);
        assert_eq!(RsvpStatus::from_raw(""), RsvpStatus::Unspecified);
    }

    #[test]
    fn attendance_raw_parse_is_total() {
        assert_eq!(
            AttendanceStatus::from_raw("Checked In"),
            AttendanceStatus::Accepted
        );
        assert_eq!(
            AttendanceStatus::from_raw("No Show"),
            AttendanceStatus::NotAttended
        );
        assert_eq!(
            AttendanceStatus::from_raw("registered"),
            AttendanceStatus::Pending
        );
        assert_eq!(
            AttendanceStatus::from_raw("whatever"),
            AttendanceStatus::Unspecified
        );
    }

    #[test]
    fn slot_priority_prefers_pending() {
        assert!(
            AttendanceStatus::Pending.slot_priority()
                < AttendanceStatus::NotAttended.slot_priority()
        );
        assert!(
            AttendanceStatus::NotAttended.slot_priority()
                < AttendanceStatus::Unspecified.slot_priority()
        );
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [
            ReconciledStatus::Attended,
            ReconciledStatus::NotAttended,
            ReconciledStatus::Pending,
            ReconciledStatus::Unknown,
        ] {
            assert_eq!(ReconciledStatus::from_label(status.as_str()), Some(status));
        }
        assert_eq!(ReconciledStatus::from_label("gone"), None);
    }
}
