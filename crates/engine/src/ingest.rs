//! CSV ingestion.
//!
//! Header-driven column mapping: the config names the headers, this module
//! locates them case-insensitively and flattens each row into a
//! `RawRecord`. Only structural problems error out; cell-level noise
//! (odd dates, unknown statuses) degrades downstream instead.

use crate::config::{SignalConfig, SourceConfig};
use crate::dates::DateResolver;
use crate::error::RosterError;
use crate::model::{AttendanceStatus, RawRecord, RsvpStatus, SignalEvent};

/// Tag used in errors for the signal log, which has no source config.
const SIGNAL_SOURCE: &str = "signals";

fn header_index(
    headers: &[String],
    source: &str,
    column: &str,
) -> Result<usize, RosterError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| RosterError::MissingColumn {
            source: source.to_string(),
            column: column.to_string(),
        })
}

fn optional_index(
    headers: &[String],
    source: &str,
    column: &Option<String>,
) -> Result<Option<usize>, RosterError> {
    column
        .as_deref()
        .map(|c| header_index(headers, source, c))
        .transpose()
}

fn read_headers(
    reader: &mut csv::Reader<&[u8]>,
    source: &str,
) -> Result<Vec<String>, RosterError> {
    Ok(reader
        .headers()
        .map_err(|e| RosterError::InvalidRecord {
            source: source.to_string(),
            line: 1,
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

/// Load one source's CSV text into raw records via its column mapping.
///
/// A column named in the mapping must exist in the header row; unmapped
/// fields default to empty. Status cells parse totally.
pub fn load_csv_records(
    source: &SourceConfig,
    csv_data: &str,
) -> Result<Vec<RawRecord>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = read_headers(&mut reader, &source.tag)?;
    let columns = &source.columns;

    let name_at = header_index(&headers, &source.tag, &columns.full_name)?;
    let program_at = header_index(&headers, &source.tag, &columns.program)?;
    let email_at = optional_index(&headers, &source.tag, &columns.email)?;
    let phone_at = optional_index(&headers, &source.tag, &columns.phone)?;
    let datetime_at = optional_index(&headers, &source.tag, &columns.datetime)?;
    let rsvp_at = optional_index(&headers, &source.tag, &columns.rsvp)?;
    let attendance_at = optional_index(&headers, &source.tag, &columns.attendance)?;
    let profession_at = optional_index(&headers, &source.tag, &columns.profession)?;
    let category_at = optional_index(&headers, &source.tag, &columns.category)?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| RosterError::InvalidRecord {
            source: source.tag.clone(),
            // header occupies line 1
            line: index + 2,
            message: e.to_string(),
        })?;
        let cell = |at: usize| row.get(at).unwrap_or("").trim().to_string();
        let opt_cell = |at: Option<usize>| match at {
            Some(at) => cell(at),
            None => String::new(),
        };
        records.push(RawRecord {
            full_name: cell(name_at),
            email: opt_cell(email_at),
            phone: opt_cell(phone_at),
            program_raw: cell(program_at),
            datetime_raw: opt_cell(datetime_at),
            rsvp: RsvpStatus::from_raw(&opt_cell(rsvp_at)),
            attendance: AttendanceStatus::from_raw(&opt_cell(attendance_at)),
            profession: opt_cell(profession_at),
            category: opt_cell(category_at),
        });
    }
    Ok(records)
}

/// Load the attendance signal log.
///
/// Rows without an event name join nothing and are skipped; unresolvable
/// timestamps keep the epoch sentinel but still count for their event.
pub fn load_signal_events(
    config: &SignalConfig,
    csv_data: &str,
    resolver: &DateResolver,
) -> Result<Vec<SignalEvent>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());
    let headers = read_headers(&mut reader, SIGNAL_SOURCE)?;

    let event_at = header_index(&headers, SIGNAL_SOURCE, &config.columns.event)?;
    let occurred_at = optional_index(&headers, SIGNAL_SOURCE, &config.columns.occurred_at)?;

    let mut events = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| RosterError::InvalidRecord {
            source: SIGNAL_SOURCE.to_string(),
            line: index + 2,
            message: e.to_string(),
        })?;
        let event_name = row.get(event_at).unwrap_or("").trim().to_string();
        if event_name.is_empty() {
            continue;
        }
        let raw_time = occurred_at
            .and_then(|at| row.get(at))
            .unwrap_or("")
            .trim();
        events.push(SignalEvent {
            event_name,
            occurred_at: resolver.resolve(raw_time),
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnMapping, MatchingConfig, SignalColumnMapping};
    use crate::dates::is_fallback;
    use crate::model::SourceKind;

    fn luma_source() -> SourceConfig {
        SourceConfig {
            tag: "luma".into(),
            kind: SourceKind::Primary,
            file: "luma.csv".into(),
            columns: ColumnMapping {
                full_name: "Name".into(),
                program: "Event Name".into(),
                email: Some("Email".into()),
                phone: None,
                datetime: Some("Event Time".into()),
                rsvp: Some("RSVP".into()),
                attendance: Some("Attendance".into()),
                profession: None,
                category: None,
            },
        }
    }

    #[test]
    fn maps_headers_case_insensitively() {
        let csv_data = "\
name,EMAIL,event name,Event Time,rsvp,attendance,Extra
Aisha,a@x.com,AI Workshop,14/05/2025,Going,Checked In,ignored
Ben,b@x.com,Pottery Basics,,,No Show,
";
        let records = load_csv_records(&luma_source(), csv_data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].full_name, "Aisha");
        assert_eq!(records[0].email, "a@x.com");
        assert_eq!(records[0].rsvp, RsvpStatus::Accepted);
        assert_eq!(records[0].attendance, AttendanceStatus::Accepted);
        assert_eq!(records[1].attendance, AttendanceStatus::NotAttended);
        assert_eq!(records[1].datetime_raw, "");
        // unmapped fields default to empty
        assert_eq!(records[0].phone, "");
        assert_eq!(records[0].category, "");
    }

    #[test]
    fn missing_mapped_column_names_the_source() {
        let csv_data = "Name,Event Name\nAisha,AI Workshop\n";
        let err = load_csv_records(&luma_source(), csv_data).unwrap_err();
        match err {
            RosterError::MissingColumn { source, column } => {
                assert_eq!(source, "luma");
                assert_eq!(column, "Email");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_row_reports_its_line() {
        let csv_data = "\
Name,Email,Event Name,Event Time,RSVP,Attendance
Aisha,a@x.com,AI Workshop,14/05/2025,Going,Checked In
broken-row-with-one-field
";
        let err = load_csv_records(&luma_source(), csv_data).unwrap_err();
        match err {
            RosterError::InvalidRecord { source, line, .. } => {
                assert_eq!(source, "luma");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cells_are_trimmed() {
        let csv_data = "\
Name,Email,Event Name,Event Time,RSVP,Attendance
  Aisha  , a@x.com ,  AI Workshop  ,14/05/2025,,
";
        let records = load_csv_records(&luma_source(), csv_data).unwrap();
        assert_eq!(records[0].full_name, "Aisha");
        assert_eq!(records[0].email, "a@x.com");
        assert_eq!(records[0].program_raw, "AI Workshop");
    }

    #[test]
    fn signal_log_loads_and_skips_unnamed_rows() {
        let config = SignalConfig {
            file: "checkins.csv".into(),
            columns: SignalColumnMapping {
                event: "Session".into(),
                occurred_at: Some("Timestamp".into()),
            },
        };
        let csv_data = "\
Session,Timestamp
AI Workshop,2025-05-13T22:30:00.000Z
,2025-05-13T23:00:00.000Z
Pottery Basics,garbage
";
        let resolver = DateResolver::new(&MatchingConfig::default());
        let events = load_signal_events(&config, csv_data, &resolver).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name, "AI Workshop");
        assert!(!is_fallback(events[0].occurred_at));
        // bad timestamps degrade to the sentinel, the event still counts
        assert!(is_fallback(events[1].occurred_at));
    }
}
