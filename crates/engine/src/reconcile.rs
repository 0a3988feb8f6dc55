//! Attendance reconciliation.
//!
//! Combines each participant's explicit attendance mark with an aggregate,
//! identity-less headcount signal per program group. The headcount can
//! confirm that N people attended without saying who; slot allocation
//! assigns those N deterministically so repeated runs agree.

use std::collections::HashMap;

use crate::config::MatchingConfig;
use crate::matcher::signal_matches;
use crate::model::{
    AttendanceStatus, Participant, ProgramGroup, ReconciledStatus, RsvpStatus, SignalEvent,
};

/// Per-group signal tallies plus the events that joined nowhere.
pub struct SignalJoin {
    pub counts: Vec<usize>,
    pub unmatched: usize,
}

/// Join check-in events to program groups by name-word overlap.
///
/// An event may credit several groups when a program recurs under one
/// name; the attendance bound still holds per group.
pub fn join_signals(
    groups: &[ProgramGroup],
    signals: &[SignalEvent],
    matching: &MatchingConfig,
) -> SignalJoin {
    let mut counts = vec![0usize; groups.len()];
    let mut unmatched = 0usize;
    for event in signals {
        let mut hit = false;
        for (index, group) in groups.iter().enumerate() {
            if signal_matches(
                &event.event_name,
                &group.canonical_name,
                matching.signal_overlap_words,
            ) {
                counts[index] += 1;
                hit = true;
            }
        }
        if !hit {
            unmatched += 1;
        }
    }
    SignalJoin { counts, unmatched }
}

/// Counters produced by the allocation pass.
pub struct ReconcileStats {
    /// Signal slots no candidate was left to fill.
    pub unallocated_slots: usize,
}

/// Reconcile per-participant statuses against the group signal counts.
///
/// Rules, in order:
/// 1. an explicit Accepted mark becomes Attended and upgrades RSVP to
///    Accepted (attendance implies prior acceptance);
/// 2. each group's surplus `signal - explicit` grants Attended to its
///    non-accepted members, Pending first, then NotAttended, then
///    Unspecified, preserving arrival order within a band;
/// 3. everyone else keeps their raw status, normalized to NotAttended,
///    Pending or Unknown.
///
/// Missing signal counts read as zero, never as an error.
pub fn reconcile_attendance(
    participants: &mut [Participant],
    group_count: usize,
    signal_counts: &[usize],
) -> ReconcileStats {
    // explicit marks first; the per-group accepted memo lives only for
    // this pass
    let mut explicit: HashMap<usize, usize> = HashMap::new();
    for participant in participants.iter_mut() {
        if participant.attendance == AttendanceStatus::Accepted {
            participant.status = ReconciledStatus::Attended;
            participant.rsvp = RsvpStatus::Accepted;
            *explicit.entry(participant.group).or_insert(0) += 1;
        }
    }

    let mut unallocated = 0usize;
    for group in 0..group_count {
        let signal = signal_counts.get(group).copied().unwrap_or(0);
        let accepted = explicit.get(&group).copied().unwrap_or(0);
        let remaining = signal.saturating_sub(accepted);
        if remaining == 0 {
            continue;
        }
        let mut candidates: Vec<usize> = (0..participants.len())
            .filter(|&i| {
                participants[i].group == group
                    && participants[i].attendance != AttendanceStatus::Accepted
            })
            .collect();
        // stable sort keeps arrival order within a priority band
        candidates.sort_by_key(|&i| participants[i].attendance.slot_priority());
        let granted = remaining.min(candidates.len());
        for &i in candidates.iter().take(granted) {
            participants[i].status = ReconciledStatus::Attended;
            participants[i].rsvp = RsvpStatus::Accepted;
        }
        unallocated += remaining - granted;
    }

    for participant in participants.iter_mut() {
        if participant.status != ReconciledStatus::Attended {
            participant.status = match participant.attendance {
                AttendanceStatus::NotAttended => ReconciledStatus::NotAttended,
                AttendanceStatus::Pending => ReconciledStatus::Pending,
                AttendanceStatus::Accepted | AttendanceStatus::Unspecified => {
                    ReconciledStatus::Unknown
                }
            };
        }
    }

    ReconcileStats {
        unallocated_slots: unallocated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::fallback_instant;
    use crate::identity::IdentityKey;

    fn member(group: usize, attendance: AttendanceStatus) -> Participant {
        Participant {
            full_name: "P".into(),
            email: String::new(),
            phone: String::new(),
            program_raw: String::new(),
            program: "AI Automation Lab".into(),
            event_at: fallback_instant(),
            rsvp: RsvpStatus::Unspecified,
            attendance,
            status: ReconciledStatus::Unknown,
            profession: String::new(),
            category: String::new(),
            source: "luma".into(),
            group,
            identity: IdentityKey::default(),
        }
    }

    fn group(name: &str) -> ProgramGroup {
        ProgramGroup {
            canonical_name: name.into(),
            representative_datetime: fallback_instant(),
            member_names: vec![name.into()],
            origin_sources: vec!["luma".into()],
            origin_label: "luma".into(),
        }
    }

    fn event(name: &str) -> SignalEvent {
        SignalEvent {
            event_name: name.into(),
            occurred_at: fallback_instant(),
        }
    }

    fn attended_count(participants: &[Participant]) -> usize {
        participants
            .iter()
            .filter(|p| p.status == ReconciledStatus::Attended)
            .count()
    }

    #[test]
    fn explicit_accepted_becomes_attended_with_rsvp_upgrade() {
        let mut ps = vec![member(0, AttendanceStatus::Accepted)];
        reconcile_attendance(&mut ps, 1, &[0]);
        assert_eq!(ps[0].status, ReconciledStatus::Attended);
        assert_eq!(ps[0].rsvp, RsvpStatus::Accepted);
    }

    #[test]
    fn surplus_slots_fill_by_priority_then_arrival() {
        // signal says 5 attended; 2 are explicit, 10 candidates remain
        let mut ps = vec![
            member(0, AttendanceStatus::Accepted),
            member(0, AttendanceStatus::Accepted),
        ];
        for i in 0..10 {
            let raw = if i % 2 == 0 {
                AttendanceStatus::Unspecified
            } else {
                AttendanceStatus::Pending
            };
            ps.push(member(0, raw));
        }
        let stats = reconcile_attendance(&mut ps, 1, &[5]);

        assert_eq!(attended_count(&ps), 5);
        assert_eq!(stats.unallocated_slots, 0);
        // pending members sit at odd offsets 3, 5, 7, ...; the first
        // three of them take the surplus slots in arrival order
        for (i, p) in ps.iter().enumerate() {
            let expect = match i {
                0 | 1 | 3 | 5 | 7 => ReconciledStatus::Attended,
                9 | 11 => ReconciledStatus::Pending,
                _ => ReconciledStatus::Unknown,
            };
            assert_eq!(p.status, expect, "participant {i}");
        }
    }

    #[test]
    fn pending_outranks_not_attended_and_unspecified() {
        let mut ps = vec![
            member(0, AttendanceStatus::Unspecified),
            member(0, AttendanceStatus::NotAttended),
            member(0, AttendanceStatus::Pending),
        ];
        reconcile_attendance(&mut ps, 1, &[1]);
        assert_eq!(ps[2].status, ReconciledStatus::Attended);
        assert_eq!(ps[1].status, ReconciledStatus::NotAttended);
        assert_eq!(ps[0].status, ReconciledStatus::Unknown);
    }

    #[test]
    fn attendance_never_exceeds_the_bound() {
        let mut ps = vec![
            member(0, AttendanceStatus::Unspecified),
            member(0, AttendanceStatus::Unspecified),
            member(0, AttendanceStatus::Unspecified),
        ];
        let stats = reconcile_attendance(&mut ps, 1, &[10]);
        assert_eq!(attended_count(&ps), 3);
        assert_eq!(stats.unallocated_slots, 7);
    }

    #[test]
    fn explicit_marks_survive_a_smaller_signal() {
        let mut ps = vec![
            member(0, AttendanceStatus::Accepted),
            member(0, AttendanceStatus::Accepted),
            member(0, AttendanceStatus::Pending),
        ];
        reconcile_attendance(&mut ps, 1, &[1]);
        // signal 1 < explicit 2: no surplus, nothing downgraded
        assert_eq!(attended_count(&ps), 2);
        assert_eq!(ps[2].status, ReconciledStatus::Pending);
    }

    #[test]
    fn zero_signal_only_normalizes_raw_statuses() {
        let mut ps = vec![
            member(0, AttendanceStatus::NotAttended),
            member(0, AttendanceStatus::Pending),
            member(0, AttendanceStatus::Unspecified),
        ];
        let stats = reconcile_attendance(&mut ps, 1, &[]);
        assert_eq!(
            ps.iter().map(|p| p.status).collect::<Vec<_>>(),
            vec![
                ReconciledStatus::NotAttended,
                ReconciledStatus::Pending,
                ReconciledStatus::Unknown
            ]
        );
        assert_eq!(stats.unallocated_slots, 0);
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let build = || {
            vec![
                member(0, AttendanceStatus::Pending),
                member(0, AttendanceStatus::Unspecified),
                member(0, AttendanceStatus::Pending),
                member(1, AttendanceStatus::Accepted),
            ]
        };
        let mut a = build();
        let mut b = build();
        reconcile_attendance(&mut a, 2, &[2, 1]);
        reconcile_attendance(&mut b, 2, &[2, 1]);
        let statuses = |ps: &[Participant]| ps.iter().map(|p| p.status).collect::<Vec<_>>();
        assert_eq!(statuses(&a), statuses(&b));
    }

    #[test]
    fn signals_credit_every_matching_group() {
        // a recurring program appears as two dated groups; one check-in
        // event credits both tallies
        let groups = vec![group("AI Automation Lab"), group("AI Automation Lab")];
        let join = join_signals(
            &groups,
            &[event("AI Automation Lab Checkin")],
            &MatchingConfig::default(),
        );
        assert_eq!(join.counts, vec![1, 1]);
        assert_eq!(join.unmatched, 0);
    }

    #[test]
    fn unjoinable_signals_are_counted() {
        let groups = vec![group("AI Automation Lab")];
        let join = join_signals(
            &groups,
            &[event("Pottery Evening"), event("Automation Lab Session")],
            &MatchingConfig::default(),
        );
        assert_eq!(join.counts, vec![1]);
        assert_eq!(join.unmatched, 1);
    }
}
