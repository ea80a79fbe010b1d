//! Output Formatting
//!
//! Terminal output for runs and history:
//! - One block per case with avg/std/median/min/max in nanoseconds
//! - History grouped by case key, sessions oldest to newest, latest marked
//! - Flat CSV and JSON renderings of the catalog

use super::execution::{CaseStatus, RunOutcome};
use sessionbench_store::csv::quote;
use sessionbench_store::layout::parse_session_date;
use sessionbench_store::{CaseResult, CatalogState, SummaryRow, generate_json_history};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Single-line statistics for a finished case
pub fn format_case_line(result: &CaseResult) -> String {
    let s = &result.stats;
    format!(
        "avg: {:.0} ns, std: {:.0}, median: {:.0}, min: {:.0}, max: {:.0}",
        s.avg, s.std, s.median, s.min, s.max
    )
}

/// Format a run for human-readable terminal display
pub fn format_run_output(outcome: &RunOutcome) -> String {
    let mut output = String::new();

    output.push('\n');
    let _ = writeln!(output, "{} Benchmarks (ns per run)", outcome.source_label);
    output.push_str(&"=".repeat(60));
    output.push('\n');

    for case in &outcome.cases {
        let _ = writeln!(output, "\n==> {}", case.display_name);
        match (&case.status, &case.result) {
            (CaseStatus::Crashed(message), _) => {
                let _ = writeln!(output, "crashed: {message}");
            }
            (CaseStatus::Skipped, _) => output.push_str("skipped: no samples\n"),
            (CaseStatus::Invalid(message), _) => {
                let _ = writeln!(output, "not recorded: {message}");
            }
            (status, Some(result)) => {
                output.push_str(&format_case_line(result));
                output.push('\n');
                if let CaseStatus::NotPersisted(error) = status {
                    let _ = writeln!(output, "not saved: {error}");
                }
            }
            (_, None) => {}
        }
    }

    if outcome.aborted {
        output.push_str("\nRun stopped after a crashed case (fail_fast)\n");
    }
    output
}

/// Short label for a session: `MM-dd HH:mm` when the id is a timestamp,
/// otherwise its last 12 characters
pub fn short_session(session_id: &str) -> String {
    match parse_session_date(session_id) {
        Some(date) => date.format("%m-%d %H:%M").to_string(),
        None => {
            let skip = session_id.chars().count().saturating_sub(12);
            session_id.chars().skip(skip).collect()
        }
    }
}

/// Format history grouped by case key.
///
/// Within a key, rows run from the oldest session to the newest; rows from
/// the latest session are marked with `*`.
pub fn format_history_human(state: &CatalogState) -> String {
    if state.rows.is_empty() {
        return "History is empty\n".to_string();
    }

    let mut groups: BTreeMap<&str, Vec<&SummaryRow>> = BTreeMap::new();
    for row in &state.rows {
        groups.entry(&row.key).or_default().push(row);
    }

    let latest = state.latest_session_id.as_deref();
    let mut output = String::new();
    for (key, mut rows) in groups {
        let title = rows.first().map_or(key, |r| r.display_name.as_str());
        let _ = writeln!(output, "{title}");
        output.push_str(&"-".repeat(60));
        output.push('\n');

        // Stable: rows of one session keep their catalog order
        rows.sort_by_key(|r| r.session_date);

        let label_width = rows.iter().map(|r| r.source_label.len()).max().unwrap_or(8);
        for row in rows {
            let marker = if Some(row.session_id.as_str()) == latest { "*" } else { " " };
            let _ = writeln!(
                output,
                "{marker} {:<11}  {:<width$}  avg {:>12} ns  median {:>12}  std {:>10}  n={}",
                short_session(&row.session_id),
                row.source_label,
                row.avg_ns,
                row.median_ns,
                row.std_ns,
                row.sample_count,
                width = label_width
            );
        }
        output.push('\n');
    }

    if let Some(latest) = latest {
        let _ = writeln!(output, "* latest session: {latest}");
    }
    output
}

/// Flat CSV of every catalog row
pub fn format_history_csv(state: &CatalogState) -> String {
    let mut output = String::from(
        "session_id,session_date,key,name,language,avg_ns,median_ns,std_ns,min_ns,max_ns,count\n",
    );
    for row in &state.rows {
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{},{}",
            quote(&row.session_id),
            row.session_date.to_rfc3339(),
            quote(&row.key),
            quote(&row.display_name),
            quote(&row.source_label),
            row.avg_ns,
            row.median_ns,
            row.std_ns,
            row.min_ns,
            row.max_ns,
            row.sample_count
        );
    }
    output
}

/// Pretty JSON of the catalog
pub fn format_history_json(state: &CatalogState) -> anyhow::Result<String> {
    Ok(generate_json_history(state)?)
}

/// Keep only rows for `key`; sessions are left as they are
pub fn filter_history(state: &CatalogState, key: &str) -> CatalogState {
    CatalogState {
        rows: state.rows_for_key(key).cloned().collect(),
        session_ids: state.session_ids.clone(),
        latest_session_id: state.latest_session_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::execution::CaseOutcome;
    use sessionbench_store::parse_summary_rows;
    use chrono::{TimeZone, Utc};

    fn state() -> CatalogState {
        let newer = "2025-10-09T08-00-00Z";
        let older = "2025-10-08T12-34-56Z";
        let mut rows = parse_summary_rows(
            "array_append,\"Vec push\",Rust,20,20,8,10,30,\"10 20 30\",3\n\
             array_append,\"Vec push\",C-ABI,25,25,0,25,25,\"25\",1\n",
            newer,
            Utc.with_ymd_and_hms(2025, 10, 9, 8, 0, 0).unwrap(),
        );
        rows.extend(parse_summary_rows(
            "array_append,\"Vec push\",Rust,40,40,0,40,40,\"40\",1\n\
             set_contains,\"Set contains\",Rust,5,5,0,5,5,\"5\",1\n",
            older,
            Utc.with_ymd_and_hms(2025, 10, 8, 12, 34, 56).unwrap(),
        ));
        CatalogState {
            rows,
            session_ids: vec![newer.into(), older.into()],
            latest_session_id: Some(newer.into()),
        }
    }

    #[test]
    fn test_case_line() {
        let result = CaseResult::from_durations("k", "n", "Rust", &[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(
            format_case_line(&result),
            "avg: 20 ns, std: 8, median: 20, min: 10, max: 30"
        );
    }

    #[test]
    fn test_run_output() {
        let result = CaseResult::from_durations("k", "Case K", "Rust", &[1.0]).unwrap();
        let outcome = RunOutcome {
            session_id: "S1".into(),
            source_label: "Rust".into(),
            cases: vec![
                CaseOutcome {
                    key: "k".into(),
                    display_name: "Case K".into(),
                    status: CaseStatus::Recorded,
                    result: Some(result),
                },
                CaseOutcome {
                    key: "boom".into(),
                    display_name: "Boom".into(),
                    status: CaseStatus::Crashed("kaboom".into()),
                    result: None,
                },
                CaseOutcome {
                    key: "short".into(),
                    display_name: "Short".into(),
                    status: CaseStatus::Invalid("expected 10 samples, got 1".into()),
                    result: None,
                },
            ],
            aborted: false,
        };

        let out = format_run_output(&outcome);
        assert!(out.contains("Rust Benchmarks (ns per run)"));
        assert!(out.contains("==> Case K\navg: 1 ns"));
        assert!(out.contains("==> Boom\ncrashed: kaboom"));
        assert!(out.contains("==> Short\nnot recorded: expected 10 samples, got 1"));
    }

    #[test]
    fn test_short_session() {
        assert_eq!(short_session("2025-10-08T12-34-56Z"), "10-08 12:34");
        assert_eq!(short_session("nightly"), "nightly");
        assert_eq!(short_session("a-very-long-session-name"), "session-name");
    }

    #[test]
    fn test_history_grouped_oldest_first() {
        let out = format_history_human(&state());

        let vec_push = out.find("Vec push").unwrap();
        let set = out.find("Set contains").unwrap();
        assert!(vec_push < set);

        let older = out.find("10-08 12:34  Rust ").unwrap();
        let newer = out.find("10-09 08:00  Rust ").unwrap();
        assert!(older < newer);
        assert!(out.contains("* 10-09 08:00  C-ABI"));
        assert!(out.contains("  10-08 12:34  Rust "));
        assert!(out.ends_with("* latest session: 2025-10-09T08-00-00Z\n"));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(format_history_human(&CatalogState::default()), "History is empty\n");
    }

    #[test]
    fn test_history_csv() {
        let out = format_history_csv(&state());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("\"2025-10-09T08-00-00Z\",2025-10-09T08:00:00+00:00,\"array_append\""));
    }

    #[test]
    fn test_filter_history() {
        let filtered = filter_history(&state(), "set_contains");
        assert_eq!(filtered.rows.len(), 1);
        assert_eq!(filtered.session_ids.len(), 2);
    }

    #[test]
    fn test_history_json() {
        let json = format_history_json(&state()).unwrap();
        assert!(json.contains("\"set_contains\""));
    }
}
