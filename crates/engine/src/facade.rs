//! Read-only filter and search over the reconciled roster.
//!
//! Pure projections: no normalization, no mutation, output in original
//! order. The program predicate accepts either the participant's own
//! cleaned title or its group's canonical name, since callers usually
//! hold the latter.

use crate::breakdown::bucket_label;
use crate::model::{Participant, ProgramGroup, ReconciledStatus, RsvpStatus};

/// One field predicate over the reconciled roster.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    Program(String),
    Profession(String),
    Category(String),
    Source(String),
    Rsvp(RsvpStatus),
    Status(ReconciledStatus),
    /// Case-insensitive substring search across every display field.
    Search(String),
}

/// Participants matching every predicate, in original order.
pub fn filter_participants<'a>(
    participants: &'a [Participant],
    groups: &[ProgramGroup],
    filters: &[FilterSpec],
) -> Vec<&'a Participant> {
    participants
        .iter()
        .filter(|p| filters.iter().all(|f| matches(p, groups, f)))
        .collect()
}

fn matches(participant: &Participant, groups: &[ProgramGroup], filter: &FilterSpec) -> bool {
    match filter {
        FilterSpec::Program(want) => {
            let canonical = groups
                .get(participant.group)
                .map(|g| g.canonical_name.as_str())
                .unwrap_or("");
            equals_ci(&participant.program, want) || equals_ci(canonical, want)
        }
        FilterSpec::Profession(want) => equals_ci(&bucket_label(&participant.profession), want),
        FilterSpec::Category(want) => equals_ci(&bucket_label(&participant.category), want),
        FilterSpec::Source(want) => equals_ci(&participant.source, want),
        FilterSpec::Rsvp(want) => participant.rsvp == *want,
        FilterSpec::Status(want) => participant.status == *want,
        FilterSpec::Search(query) => {
            haystack(participant, groups).contains(&query.trim().to_lowercase())
        }
    }
}

fn equals_ci(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn haystack(participant: &Participant, groups: &[ProgramGroup]) -> String {
    let canonical = groups
        .get(participant.group)
        .map(|g| g.canonical_name.as_str())
        .unwrap_or("");
    [
        participant.full_name.as_str(),
        participant.email.as_str(),
        participant.phone.as_str(),
        participant.program_raw.as_str(),
        participant.program.as_str(),
        participant.profession.as_str(),
        participant.category.as_str(),
        participant.source.as_str(),
        canonical,
        participant.status.as_str(),
        participant.rsvp.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}
