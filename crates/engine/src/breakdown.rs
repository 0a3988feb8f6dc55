//! Roll-up breakdowns over the reconciled roster.

use crate::model::{Breakdowns, Participant, ProgramGroup};
use crate::normalize::UNSPECIFIED;

/// Display label for a free-text field: trimmed, with empty collapsing to
/// the Unspecified bucket.
pub fn bucket_label(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNSPECIFIED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Count participants by program, profession and category.
pub fn build_breakdowns(participants: &[Participant], groups: &[ProgramGroup]) -> Breakdowns {
    let mut breakdowns = Breakdowns::default();
    for participant in participants {
        let program = groups
            .get(participant.group)
            .map(|g| g.canonical_name.clone())
            .unwrap_or_else(|| UNSPECIFIED.to_string());
        *breakdowns.by_program.entry(program).or_insert(0) += 1;
        *breakdowns
            .by_profession
            .entry(bucket_label(&participant.profession))
            .or_insert(0) += 1;
        *breakdowns
            .by_category
            .entry(bucket_label(&participant.category))
            .or_insert(0) += 1;
    }
    breakdowns
}
