//! Program grouping.
//!
//! Folds raw program mentions into canonical `ProgramGroup`s. A candidate
//! joins an existing group only when it lands on the same calendar date
//! and its cleaned name is similar to the group's canonical name. Member
//! names keep the title variants exactly as the sources wrote them, so a
//! date-prefixed variant and its bare form stay visible as two entries.
//! A final fold pass removes same-date duplicates whose canonical names
//! converged as members accumulated, and attaches undated groups to a
//! similar dated one. Group order is most recent first.

use crate::config::MatchingConfig;
use crate::dates::is_fallback;
use crate::matcher::is_similar;
use crate::model::{Participant, ProgramGroup};
use crate::normalize::UNSPECIFIED;

/// Grouping result: the canonical groups plus one group index per input
/// participant, parallel to the input slice.
pub struct GroupOutput {
    pub groups: Vec<ProgramGroup>,
    pub assignment: Vec<usize>,
}

/// Cluster participants into program groups, in arrival order.
pub fn group_programs(participants: &[Participant], matching: &MatchingConfig) -> GroupOutput {
    let mut groups: Vec<ProgramGroup> = Vec::new();
    let mut assignment: Vec<usize> = Vec::with_capacity(participants.len());

    for participant in participants {
        let candidate_date = participant.event_at.date();
        let found = groups.iter().position(|g| {
            g.representative_datetime.date() == candidate_date
                && is_similar(
                    &g.canonical_name,
                    &participant.program,
                    matching.similarity_threshold,
                )
        });
        match found {
            Some(index) => {
                add_member(
                    &mut groups[index],
                    participant.program_raw.trim(),
                    &participant.source,
                );
                assignment.push(index);
            }
            None => {
                groups.push(new_group(participant));
                assignment.push(groups.len() - 1);
            }
        }
    }

    let target = fold_groups(&mut groups, matching);

    // live groups, most recent first; sort is stable so creation order
    // breaks datetime ties
    let mut kept: Vec<usize> = (0..groups.len()).filter(|&i| target[i] == i).collect();
    kept.sort_by(|&a, &b| {
        groups[b]
            .representative_datetime
            .cmp(&groups[a].representative_datetime)
    });
    let mut final_index = vec![0usize; groups.len()];
    for (position, &old) in kept.iter().enumerate() {
        final_index[old] = position;
    }
    let ordered: Vec<ProgramGroup> = kept.iter().map(|&old| groups[old].clone()).collect();
    let assignment = assignment
        .into_iter()
        .map(|index| final_index[target[index]])
        .collect();

    GroupOutput {
        groups: ordered,
        assignment,
    }
}

/// Fold pass. Returns `target`, mapping every original group index to the
/// index of the group that absorbed it (itself when still live).
fn fold_groups(groups: &mut [ProgramGroup], matching: &MatchingConfig) -> Vec<usize> {
    let n = groups.len();
    let mut target: Vec<usize> = (0..n).collect();

    // same-date duplicates: canonical names can converge as members
    // accumulate, so re-test every live pair
    for i in 0..n {
        if target[i] != i {
            continue;
        }
        let mut j = i + 1;
        while j < n {
            if target[j] == j
                && groups[i].representative_datetime.date()
                    == groups[j].representative_datetime.date()
                && is_similar(
                    &groups[i].canonical_name,
                    &groups[j].canonical_name,
                    matching.similarity_threshold,
                )
            {
                if outranks(&groups[j], &groups[i]) {
                    absorb(groups, j, i);
                    target[i] = j;
                    break;
                }
                absorb(groups, i, j);
                target[j] = i;
            }
            j += 1;
        }
    }

    // undated groups attach to the first similar dated group, otherwise
    // stay standalone
    for i in 0..n {
        if target[i] != i || !is_fallback(groups[i].representative_datetime) {
            continue;
        }
        for j in 0..n {
            if j == i || target[j] != j || is_fallback(groups[j].representative_datetime) {
                continue;
            }
            if is_similar(
                &groups[j].canonical_name,
                &groups[i].canonical_name,
                matching.similarity_threshold,
            ) {
                absorb(groups, j, i);
                target[i] = j;
                break;
            }
        }
    }

    // successive folds build chains; flatten them
    for i in 0..n {
        let mut t = target[i];
        while target[t] != t {
            t = target[t];
        }
        target[i] = t;
    }
    target
}

/// Keeper rule for folding: most members wins, then longest canonical
/// name. On a full tie the incumbent (earlier) group keeps.
fn outranks(challenger: &ProgramGroup, incumbent: &ProgramGroup) -> bool {
    let c = (
        challenger.member_names.len(),
        challenger.canonical_name.chars().count(),
    );
    let i = (
        incumbent.member_names.len(),
        incumbent.canonical_name.chars().count(),
    );
    c > i
}

fn absorb(groups: &mut [ProgramGroup], winner: usize, loser: usize) {
    let member_names = std::mem::take(&mut groups[loser].member_names);
    let origin_sources = std::mem::take(&mut groups[loser].origin_sources);
    let keeper = &mut groups[winner];
    for name in member_names {
        if !keeper.member_names.contains(&name) {
            keeper.member_names.push(name);
        }
    }
    for source in origin_sources {
        if !keeper.origin_sources.contains(&source) {
            keeper.origin_sources.push(source);
        }
    }
    refresh_display(keeper);
}

fn new_group(participant: &Participant) -> ProgramGroup {
    let variant = participant.program_raw.trim().to_string();
    ProgramGroup {
        canonical_name: variant.clone(),
        representative_datetime: participant.event_at,
        member_names: vec![variant],
        origin_sources: vec![participant.source.clone()],
        origin_label: participant.source.clone(),
    }
}

fn add_member(group: &mut ProgramGroup, name: &str, source: &str) {
    if !group.member_names.iter().any(|m| m == name) {
        group.member_names.push(name.to_string());
    }
    if !group.origin_sources.iter().any(|s| s == source) {
        group.origin_sources.push(source.to_string());
    }
    refresh_display(group);
}

fn refresh_display(group: &mut ProgramGroup) {
    group.canonical_name = display_name(&group.member_names);
    group.origin_label = if group.origin_sources.len() > 1 {
        "Multiple Sources".to_string()
    } else {
        group
            .origin_sources
            .first()
            .cloned()
            .unwrap_or_else(|| UNSPECIFIED.to_string())
    };
}

/// Canonical display name over the member variants: first two joined with
/// " + ", then a "+ N more" tail.
fn display_name(members: &[String]) -> String {
    match members.len() {
        0 => UNSPECIFIED.to_string(),
        1 => members[0].clone(),
        2 => format!("{} + {}", members[0], members[1]),
        n => format!("{} + {} + {} more", members[0], members[1], n - 2),
    }
}
