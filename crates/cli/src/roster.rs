//! `rollcall run` / `validate` / `filter` — config-driven roster
//! reconciliation commands.

use std::path::{Path, PathBuf};

use rollcall_engine::config::RosterConfig;
use rollcall_engine::dates::DateResolver;
use rollcall_engine::facade::{filter_participants, FilterSpec};
use rollcall_engine::ingest::{load_csv_records, load_signal_events};
use rollcall_engine::model::{Participant, ReconciledStatus, RsvpStatus, SourceRecords};
use rollcall_engine::{run, RosterError, RosterInput, RosterResult};

use crate::exit_codes::{roster_exit_code, EXIT_ROSTER_FINDINGS, EXIT_ROSTER_RUNTIME};
use crate::CliError;

fn roster_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn engine_err(err: RosterError) -> CliError {
    roster_err(roster_exit_code(&err), err.to_string())
}

/// Parse and validate the config, returning it with its base directory.
/// Data paths in the config resolve relative to the config file.
fn load_config(config_path: &Path) -> Result<(RosterConfig, PathBuf), CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| roster_err(EXIT_ROSTER_RUNTIME, format!("cannot read config: {e}")))?;
    let config = RosterConfig::from_toml(&config_str).map_err(engine_err)?;
    let base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok((config, base_dir))
}

/// Load every configured CSV into engine input.
fn load_input(config: &RosterConfig, base_dir: &Path) -> Result<RosterInput, CliError> {
    let resolver = DateResolver::new(&config.matching);

    let mut sources = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let csv_path = base_dir.join(&source.file);
        let csv_data = std::fs::read_to_string(&csv_path).map_err(|e| {
            roster_err(
                EXIT_ROSTER_RUNTIME,
                format!("cannot read {}: {e}", csv_path.display()),
            )
        })?;
        let records = load_csv_records(source, &csv_data).map_err(engine_err)?;
        sources.push(SourceRecords {
            tag: source.tag.clone(),
            kind: source.kind,
            records,
        });
    }

    let signals = match &config.signals {
        Some(signal_config) => {
            let csv_path = base_dir.join(&signal_config.file);
            let csv_data = std::fs::read_to_string(&csv_path).map_err(|e| {
                roster_err(
                    EXIT_ROSTER_RUNTIME,
                    format!("cannot read {}: {e}", csv_path.display()),
                )
            })?;
            load_signal_events(signal_config, &csv_data, &resolver).map_err(engine_err)?
        }
        None => Vec::new(),
    };

    Ok(RosterInput { sources, signals })
}

fn run_roster(config_path: &Path) -> Result<(RosterConfig, PathBuf, RosterResult), CliError> {
    let (config, base_dir) = load_config(config_path)?;
    let input = load_input(&config, &base_dir)?;
    let result = run(&config, &input).map_err(engine_err)?;
    Ok((config, base_dir, result))
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let (config, base_dir, result) = run_roster(&config_path)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| roster_err(EXIT_ROSTER_RUNTIME, format!("JSON serialization error: {e}")))?;

    // --output wins over the config's output path
    let output_path =
        output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = output_path {
        std::fs::write(path, &json_str)
            .map_err(|e| roster_err(EXIT_ROSTER_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "roster '{}': {} participants across {} program(s) — {} attended, {} not attended, {} pending, {} unknown",
        result.meta.config_name,
        s.participants,
        s.programs,
        s.attended,
        s.not_attended,
        s.pending,
        s.unknown,
    );
    eprintln!(
        "merge: {} duplicate(s) skipped, {} record(s) dropped",
        s.duplicates_skipped, s.records_dropped,
    );
    if s.signal_events > 0 {
        eprintln!(
            "signals: {} event(s), {} unmatched, {} unallocated slot(s)",
            s.signal_events, s.unmatched_signals, s.unallocated_slots,
        );
    }

    if s.unmatched_signals > 0 || s.unallocated_slots > 0 {
        return Err(roster_err(
            EXIT_ROSTER_FINDINGS,
            format!(
                "{} unmatched signal(s), {} unallocated slot(s)",
                s.unmatched_signals, s.unallocated_slots,
            ),
        ));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let (config, _base_dir) = load_config(&config_path)?;
    let signal_note = if config.signals.is_some() {
        ", signal log"
    } else {
        ""
    };
    eprintln!(
        "valid: roster '{}' with {} source(s){}",
        config.name,
        config.sources.len(),
        signal_note,
    );
    Ok(())
}

pub fn cmd_filter(
    config_path: PathBuf,
    wheres: Vec<String>,
    search: Option<String>,
    json_output: bool,
) -> Result<(), CliError> {
    let mut filters = Vec::with_capacity(wheres.len() + 1);
    for expr in &wheres {
        filters.push(parse_where(expr)?);
    }
    if let Some(query) = search {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Err(CliError::args("--search needs a non-empty query"));
        }
        filters.push(FilterSpec::Search(query));
    }
    if filters.is_empty() {
        return Err(CliError::args("nothing to filter on")
            .with_hint("pass --where 'field=value' and/or --search TEXT"));
    }

    let (_config, _base_dir, result) = run_roster(&config_path)?;
    let matched = filter_participants(&result.participants, &result.programs, &filters);

    if json_output {
        let report = FilterReport {
            matched: matched.len(),
            total: result.participants.len(),
            participants: &matched,
        };
        let json_str = serde_json::to_string_pretty(&report).map_err(|e| {
            roster_err(EXIT_ROSTER_RUNTIME, format!("JSON serialization error: {e}"))
        })?;
        println!("{json_str}");
    } else {
        for p in &matched {
            println!(
                "{:<28} {:<40} {:<14} {}",
                p.full_name,
                p.program,
                p.status.as_str(),
                p.source,
            );
        }
    }

    eprintln!(
        "matched {} of {} participants",
        matched.len(),
        result.participants.len(),
    );
    Ok(())
}

#[derive(serde::Serialize)]
struct FilterReport<'a> {
    matched: usize,
    total: usize,
    participants: &'a [&'a Participant],
}

// ============================================================================
// --where expressions
// ============================================================================

/// Parse one `--where` expression into a filter predicate.
///
/// Only `=` is supported; substring matching is the `--search` flag.
fn parse_where(expr: &str) -> Result<FilterSpec, CliError> {
    if expr.contains("!=") || expr.contains('<') || expr.contains('>') {
        return Err(
            CliError::args(format!("unsupported operator in --where {:?}", expr))
                .with_hint("only equality filters are supported: 'field=value'"),
        );
    }
    if expr.contains('~') {
        return Err(
            CliError::args(format!("unsupported operator ~ in --where {:?}", expr))
                .with_hint("use --search TEXT for substring matching"),
        );
    }
    let Some(pos) = expr.find('=') else {
        return Err(CliError::args(format!("no operator found in --where {:?}", expr))
            .with_hint("syntax: 'field=value' with fields program, profession, category, source, rsvp, status"));
    };

    let field = expr[..pos].trim().to_lowercase();
    if field.is_empty() {
        return Err(CliError::args(format!(
            "empty field name in --where {:?}",
            expr
        )));
    }

    // Strip one layer of surrounding quotes from the value
    let value = expr[pos + 1..].trim();
    let value = if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
        || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
    {
        &value[1..value.len() - 1]
    } else {
        value
    };

    match field.as_str() {
        "program" => Ok(FilterSpec::Program(value.to_string())),
        "profession" => Ok(FilterSpec::Profession(value.to_string())),
        "category" => Ok(FilterSpec::Category(value.to_string())),
        "source" => Ok(FilterSpec::Source(value.to_string())),
        "rsvp" => RsvpStatus::from_label(value)
            .map(FilterSpec::Rsvp)
            .ok_or_else(|| {
                CliError::args(format!("unknown rsvp value {:?}", value))
                    .with_hint("one of: accepted, pending, unspecified")
            }),
        "status" => ReconciledStatus::from_label(value)
            .map(FilterSpec::Status)
            .ok_or_else(|| {
                CliError::args(format!("unknown status value {:?}", value))
                    .with_hint("one of: attended, not_attended, pending, unknown")
            }),
        _ => Err(CliError::args(format!("unknown field {:?}", field)).with_hint(
            "available fields: program, profession, category, source, rsvp, status",
        )),
    }
}
