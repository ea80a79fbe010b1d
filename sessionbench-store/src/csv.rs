//! CSV Encoding
//!
//! Two tables are written per session:
//!
//! ```text
//! summary.csv        key,name,language,avg_ns,median_ns,std_ns,min_ns,max_ns,samples,count
//! cases/<k>_<s>.csv  sampleIndex,duration_ns
//! ```
//!
//! Durations are truncated to whole nanoseconds on write. The display name
//! and the space-separated raw sample list are always double-quoted; the key
//! and source label are quoted only when they contain a delimiter.
//!
//! The reader is a minimal quote-aware splitter, enough for the files this
//! module writes. Embedded quotes are doubled (`""`).

use crate::result::CaseResult;
use sessionbench_stats::truncate_nanos;
use std::borrow::Cow;
use std::fmt::Write;

/// Header row of `summary.csv`
pub const SUMMARY_HEADER: &str =
    "key,name,language,avg_ns,median_ns,std_ns,min_ns,max_ns,samples,count\n";

/// Header row of a per-case sample table
pub const CASE_HEADER: &str = "sampleIndex,duration_ns\n";

/// Minimum number of fields a summary row must have to be read back
pub const SUMMARY_FIELD_COUNT: usize = 10;

/// Encode one summary row, including the trailing newline
pub fn encode_summary_row(result: &CaseResult) -> String {
    let raw_samples = result
        .samples
        .iter()
        .map(|s| truncate_nanos(s.duration_nanos).to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let stats = &result.stats;
    format!(
        "{},{},{},{},{},{},{},{},{},{}\n",
        quote_if_needed(&result.key),
        quote(&result.display_name),
        quote_if_needed(&result.source_label),
        truncate_nanos(stats.avg),
        truncate_nanos(stats.median),
        truncate_nanos(stats.std),
        truncate_nanos(stats.min),
        truncate_nanos(stats.max),
        quote(&raw_samples),
        result.samples.len()
    )
}

/// Encode the complete per-case sample table, header included
pub fn encode_case_table(result: &CaseResult) -> String {
    let mut out = String::with_capacity(CASE_HEADER.len() + result.samples.len() * 16);
    out.push_str(CASE_HEADER);
    for sample in &result.samples {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{},{}", sample.index, truncate_nanos(sample.duration_nanos));
    }
    out
}

/// Split a line on commas that are not inside double quotes.
///
/// Quote characters are kept in the returned fields; see [`unquote`].
pub fn split_csv_line(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut quoted = false;

    for (i, ch) in line.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}

/// Strip surrounding whitespace and one pair of enclosing quotes, undoubling
/// any embedded quotes
pub fn unquote(field: &str) -> Cow<'_, str> {
    let trimmed = field.trim();
    match trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) if inner.contains("\"\"") => Cow::Owned(inner.replace("\"\"", "\"")),
        Some(inner) => Cow::Borrowed(inner),
        None => Cow::Borrowed(trimmed),
    }
}

/// Quote a field unconditionally, doubling embedded quotes.
///
/// Line breaks become spaces so a row stays on one line.
pub fn quote(field: &str) -> String {
    let flat = field.replace(['\r', '\n'], " ");
    format!("\"{}\"", flat.replace('"', "\"\""))
}

fn quote_if_needed(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(quote(field))
    } else {
        Cow::Borrowed(field)
    }
}
