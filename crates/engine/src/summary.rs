//! Run summary computation.

use std::collections::BTreeMap;

use crate::model::{Participant, ReconciledStatus, RosterSummary};

/// Counters carried forward from the merge, join and allocation passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunTallies {
    pub duplicates_skipped: usize,
    pub records_dropped: usize,
    pub signal_events: usize,
    pub unmatched_signals: usize,
    pub unallocated_slots: usize,
}

/// Fold the reconciled roster into its summary block.
pub fn compute_summary(
    participants: &[Participant],
    programs: usize,
    tallies: RunTallies,
) -> RosterSummary {
    let mut summary = RosterSummary {
        participants: participants.len(),
        programs,
        duplicates_skipped: tallies.duplicates_skipped,
        records_dropped: tallies.records_dropped,
        signal_events: tallies.signal_events,
        unmatched_signals: tallies.unmatched_signals,
        unallocated_slots: tallies.unallocated_slots,
        ..RosterSummary::default()
    };
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    for participant in participants {
        match participant.status {
            ReconciledStatus::Attended => summary.attended += 1,
            ReconciledStatus::NotAttended => summary.not_attended += 1,
            ReconciledStatus::Pending => summary.pending += 1,
            ReconciledStatus::Unknown => summary.unknown += 1,
        }
        *status_counts
            .entry(participant.status.as_str().to_string())
            .or_insert(0) += 1;
    }
    summary.status_counts = status_counts;
    summary
}
