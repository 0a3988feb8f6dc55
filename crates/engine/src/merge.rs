//! Cross-source participant merge.
//!
//! Primary sources are unioned verbatim: one person legitimately appears
//! once per program they registered for, so primaries never dedup against
//! each other. Secondary records are admitted only when their identity
//! collides with no primary record. Append-only and order-preserving.

use std::collections::HashSet;

use crate::config::MatchingConfig;
use crate::dates::{is_fallback, DateResolver};
use crate::identity::IdentityKey;
use crate::model::{Participant, RawRecord, ReconciledStatus, RosterInput, SourceKind};
use crate::normalize::{TitleCleaner, UNSPECIFIED};

/// Merge result plus the counters the summary reports.
pub struct MergeOutput {
    pub participants: Vec<Participant>,
    /// Secondary records excluded by identity collision.
    pub duplicates_skipped: usize,
    /// Records no pipeline stage could use.
    pub records_dropped: usize,
}

/// Union all sources into one ordered participant collection.
///
/// Drop rules: a primary record must carry some contact identity and a
/// program name; a secondary record must carry a program name, but may
/// have an empty identity (it then collides with nothing and is kept
/// for display).
pub fn merge_sources(input: &RosterInput, matching: &MatchingConfig) -> MergeOutput {
    let cleaner = TitleCleaner::new(matching);
    let resolver = DateResolver::new(matching);
    let mut out = MergeOutput {
        participants: Vec::new(),
        duplicates_skipped: 0,
        records_dropped: 0,
    };
    let mut primary_emails: HashSet<String> = HashSet::new();
    let mut primary_phones: HashSet<String> = HashSet::new();

    for source in input.sources.iter().filter(|s| s.kind == SourceKind::Primary) {
        for record in &source.records {
            let participant = build_participant(record, &source.tag, &cleaner, &resolver);
            if participant.identity.is_empty() || participant.program == UNSPECIFIED {
                out.records_dropped += 1;
                continue;
            }
            if !participant.identity.email.is_empty() {
                primary_emails.insert(participant.identity.email.clone());
            }
            if !participant.identity.phone.is_empty() {
                primary_phones.insert(participant.identity.phone.clone());
            }
            out.participants.push(participant);
        }
    }

    for source in input.sources.iter().filter(|s| s.kind == SourceKind::Secondary) {
        for record in &source.records {
            let participant = build_participant(record, &source.tag, &cleaner, &resolver);
            if participant.program == UNSPECIFIED {
                out.records_dropped += 1;
                continue;
            }
            let email_seen = !participant.identity.email.is_empty()
                && primary_emails.contains(&participant.identity.email);
            let phone_seen = !participant.identity.phone.is_empty()
                && primary_phones.contains(&participant.identity.phone);
            if email_seen || phone_seen {
                out.duplicates_skipped += 1;
                continue;
            }
            out.participants.push(participant);
        }
    }

    out
}

fn build_participant(
    record: &RawRecord,
    source_tag: &str,
    cleaner: &TitleCleaner,
    resolver: &DateResolver,
) -> Participant {
    let mut event_at = resolver.resolve(&record.datetime_raw);
    if is_fallback(event_at) {
        // some sources only carry the date inside the title text
        event_at = resolver.resolve(&record.program_raw);
    }
    Participant {
        full_name: record.full_name.trim().to_string(),
        email: record.email.trim().to_string(),
        phone: record.phone.trim().to_string(),
        program_raw: record.program_raw.clone(),
        program: cleaner.clean(&record.program_raw),
        event_at,
        rsvp: record.rsvp,
        attendance: record.attendance,
        status: ReconciledStatus::Unknown,
        profession: record.profession.trim().to_string(),
        category: record.category.trim().to_string(),
        source: source_tag.to_string(),
        group: 0,
        identity: IdentityKey::new(&record.email, &record.phone),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceRecords;

    fn rec(name: &str, email: &str, phone: &str, program: &str, datetime: &str) -> RawRecord {
        RawRecord {
            full_name: name.into(),
            email: email.into(),
            phone: phone.into(),
            program_raw: program.into(),
            datetime_raw: datetime.into(),
            ..RawRecord::default()
        }
    }

    fn source(tag: &str, kind: SourceKind, records: Vec<RawRecord>) -> SourceRecords {
        SourceRecords {
            tag: tag.into(),
            kind,
            records,
        }
    }

    fn merge(sources: Vec<SourceRecords>) -> MergeOutput {
        let input = RosterInput {
            sources,
            signals: Vec::new(),
        };
        merge_sources(&input, &MatchingConfig::default())
    }

    #[test]
    fn primary_multiplicities_are_not_collapsed() {
        let out = merge(vec![source(
            "luma",
            SourceKind::Primary,
            vec![
                rec("Aisha", "a@x.com", "", "AI Workshop", "14/05/2025"),
                rec("Aisha", "a@x.com", "", "AI Workshop (Part 2)", "21/05/2025"),
            ],
        )]);
        assert_eq!(out.participants.len(), 2);
        assert_eq!(out.duplicates_skipped, 0);
    }

    #[test]
    fn secondary_sharing_primary_email_is_excluded() {
        let out = merge(vec![
            source(
                "luma",
                SourceKind::Primary,
                vec![
                    rec("Aisha", "a@x.com", "", "AI Workshop", "14/05/2025"),
                    rec("Aisha", "a@x.com", "", "AI Workshop (Part 2)", "21/05/2025"),
                ],
            ),
            source(
                "crm",
                SourceKind::Secondary,
                vec![rec("Aisha R", "A@X.com ", "", "AI Workshop", "14/05/2025")],
            ),
        ]);
        assert_eq!(out.participants.len(), 2);
        assert_eq!(out.duplicates_skipped, 1);
        assert!(out.participants.iter().all(|p| p.source == "luma"));
    }

    #[test]
    fn secondary_sharing_primary_phone_is_excluded() {
        let out = merge(vec![
            source(
                "luma",
                SourceKind::Primary,
                vec![rec("Ben", "", "012-345 6789", "AI Workshop", "14/05/2025")],
            ),
            source(
                "crm",
                SourceKind::Secondary,
                vec![rec("Ben T", "", "+60 12-345 6789", "AI Workshop", "14/05/2025")],
            ),
        ]);
        assert_eq!(out.participants.len(), 1);
        assert_eq!(out.duplicates_skipped, 1);
    }

    #[test]
    fn secondary_without_collision_is_added_in_order() {
        let out = merge(vec![
            source(
                "luma",
                SourceKind::Primary,
                vec![rec("Aisha", "a@x.com", "", "AI Workshop", "14/05/2025")],
            ),
            source(
                "crm",
                SourceKind::Secondary,
                vec![rec("Chen", "c@x.com", "", "AI Workshop", "14/05/2025")],
            ),
        ]);
        assert_eq!(out.participants.len(), 2);
        assert_eq!(out.participants[0].source, "luma");
        assert_eq!(out.participants[1].source, "crm");
    }

    #[test]
    fn primary_without_identity_is_dropped() {
        let out = merge(vec![source(
            "luma",
            SourceKind::Primary,
            vec![
                rec("Ghost", "", "", "AI Workshop", "14/05/2025"),
                rec("Aisha", "a@x.com", "", "AI Workshop", "14/05/2025"),
            ],
        )]);
        assert_eq!(out.participants.len(), 1);
        assert_eq!(out.records_dropped, 1);
    }

    #[test]
    fn secondary_without_identity_is_kept_for_display() {
        let out = merge(vec![
            source(
                "luma",
                SourceKind::Primary,
                vec![rec("Aisha", "a@x.com", "", "AI Workshop", "14/05/2025")],
            ),
            source(
                "crm",
                SourceKind::Secondary,
                vec![rec("Walk-in", "", "", "AI Workshop", "14/05/2025")],
            ),
        ]);
        assert_eq!(out.participants.len(), 2);
        assert_eq!(out.records_dropped, 0);
    }

    #[test]
    fn record_without_program_is_dropped() {
        let out = merge(vec![
            source(
                "luma",
                SourceKind::Primary,
                vec![rec("Aisha", "a@x.com", "", "", "14/05/2025")],
            ),
            source(
                "crm",
                SourceKind::Secondary,
                vec![rec("Chen", "c@x.com", "", "   ", "14/05/2025")],
            ),
        ]);
        assert!(out.participants.is_empty());
        assert_eq!(out.records_dropped, 2);
    }

    #[test]
    fn equal_short_phone_digits_still_collide() {
        // short digit runs skip the "60" prefix but stay comparable
        let out = merge(vec![
            source(
                "luma",
                SourceKind::Primary,
                vec![rec("Aisha", "a@x.com", "999", "AI Workshop", "14/05/2025")],
            ),
            source(
                "crm",
                SourceKind::Secondary,
                vec![rec("Aisha binti A", "", "999", "AI Workshop", "14/05/2025")],
            ),
        ]);
        assert_eq!(out.participants.len(), 1);
        assert_eq!(out.duplicates_skipped, 1);
    }

    #[test]
    fn title_date_backfills_missing_datetime() {
        let out = merge(vec![source(
            "luma",
            SourceKind::Primary,
            vec![rec(
                "Aisha",
                "a@x.com",
                "",
                "14 May - Creative AI Bootcamp",
                "",
            )],
        )]);
        assert!(!is_fallback(out.participants[0].event_at));
        assert_eq!(out.participants[0].program, "Creative AI Bootcamp");
    }
}
