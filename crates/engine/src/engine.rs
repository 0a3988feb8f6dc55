//! Reconciliation entry point.

use chrono::Utc;

use crate::breakdown::build_breakdowns;
use crate::config::RosterConfig;
use crate::error::RosterError;
use crate::grouper::group_programs;
use crate::merge::merge_sources;
use crate::model::{RosterInput, RosterMeta, RosterResult};
use crate::reconcile::{join_signals, reconcile_attendance};
use crate::summary::{compute_summary, RunTallies};

/// Run one reconciliation over pre-loaded input.
///
/// Pure except for the `run_at` stamp in the metadata block: everything
/// under `summary`, `participants`, `programs` and `breakdowns` is a
/// deterministic function of the input. The input's source tags must
/// match the config's, with no duplicates; an empty record list for a
/// configured source is fine.
pub fn run(config: &RosterConfig, input: &RosterInput) -> Result<RosterResult, RosterError> {
    config.validate()?;
    check_sources(config, input)?;

    let merged = merge_sources(input, &config.matching);
    let mut participants = merged.participants;

    let grouped = group_programs(&participants, &config.matching);
    for (participant, &group) in participants.iter_mut().zip(grouped.assignment.iter()) {
        participant.group = group;
    }

    let join = join_signals(&grouped.groups, &input.signals, &config.matching);
    let stats = reconcile_attendance(&mut participants, grouped.groups.len(), &join.counts);

    let breakdowns = build_breakdowns(&participants, &grouped.groups);
    let summary = compute_summary(
        &participants,
        grouped.groups.len(),
        RunTallies {
            duplicates_skipped: merged.duplicates_skipped,
            records_dropped: merged.records_dropped,
            signal_events: input.signals.len(),
            unmatched_signals: join.unmatched,
            unallocated_slots: stats.unallocated_slots,
        },
    );

    Ok(RosterResult {
        meta: RosterMeta {
            config_name: config.name.clone(),
            sources: input.sources.len(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: Utc::now().to_rfc3339(),
        },
        summary,
        participants,
        programs: grouped.groups,
        breakdowns,
    })
}

fn check_sources(config: &RosterConfig, input: &RosterInput) -> Result<(), RosterError> {
    for (i, source) in input.sources.iter().enumerate() {
        if input.sources[..i].iter().any(|s| s.tag == source.tag) {
            return Err(RosterError::DuplicateSource(source.tag.clone()));
        }
        if !config.sources.iter().any(|c| c.tag == source.tag) {
            return Err(RosterError::UnknownSource(format!(
                "input source '{}' is not configured",
                source.tag
            )));
        }
    }
    for configured in &config.sources {
        if !input.sources.iter().any(|s| s.tag == configured.tag) {
            return Err(RosterError::UnknownSource(format!(
                "configured source '{}' has no input data",
                configured.tag
            )));
        }
    }
    Ok(())
}
