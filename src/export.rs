//! CSV Export
//!
//! Writes fetched transactions as CSV for analysis outside the dashboard.
//!
//! - XP rows: `date,amount,total,object,object_type`, where `total` is the
//!   running sum the progress chart plots
//! - Skill rows: `skill,amount`, one per transaction, unaggregated

use serde::Serialize;
use std::io::Write;
use thiserror::Error;

use crate::chart::{running, skill_key, Aggregation};
use crate::client::Transaction;
use crate::format::format_date;

#[derive(Debug, Serialize)]
struct XpRow<'a> {
    date: String,
    amount: f64,
    total: f64,
    object: &'a str,
    object_type: &'a str,
}

#[derive(Debug, Serialize)]
struct SkillRow<'a> {
    skill: &'a str,
    amount: f64,
}

/// Write XP transactions with their running total. Returns the row count.
pub fn write_xp_csv<W: Write>(writer: W, records: &[Transaction]) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let dated = records.iter().filter(|r| r.created_at.is_some());
    let totals = running(records, Aggregation::Sum);

    let mut rows = 0;
    for (record, point) in dated.zip(&totals) {
        let (object, object_type) = record
            .object
            .as_ref()
            .map(|o| (o.name.as_str(), o.kind.as_str()))
            .unwrap_or(("", ""));

        csv.serialize(XpRow {
            date: format_date(&point.timestamp),
            amount: record.amount,
            total: point.value,
            object,
            object_type,
        })?;
        rows += 1;
    }

    csv.flush()?;
    Ok(rows)
}

/// Write skill transactions keyed by skill name. Returns the row count.
pub fn write_skills_csv<W: Write>(
    writer: W,
    records: &[Transaction],
) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut rows = 0;
    for record in records {
        let Some(kind) = record.kind.as_deref() else {
            continue;
        };
        csv.serialize(SkillRow {
            skill: skill_key(kind),
            amount: record.amount,
        })?;
        rows += 1;
    }

    csv.flush()?;
    Ok(rows)
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_xp_rows_carry_running_total() {
        let records = vec![
            Transaction::xp(1000.0, Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap())
                .object("go-reloaded", "project"),
            Transaction::skill("xp", 5.0),
            Transaction::xp(500.0, Utc.with_ymd_and_hms(2024, 2, 10, 9, 0, 0).unwrap()),
        ];

        let mut out = Vec::new();
        let rows = write_xp_csv(&mut out, &records).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,amount,total,object,object_type");
        assert_eq!(lines[1], "2024-01-10,1000.0,1000.0,go-reloaded,project");
        assert_eq!(lines[2], "2024-02-10,500.0,1500.0,,");
    }

    #[test]
    fn test_skill_rows_strip_prefix() {
        let records = vec![
            Transaction::skill("skill_go", 55.0),
            Transaction::skill("skill_front-end", 20.0),
        ];

        let mut out = Vec::new();
        assert_eq!(write_skills_csv(&mut out, &records).unwrap(), 2);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "skill,amount\ngo,55.0\nfront-end,20.0\n");
    }

    #[test]
    fn test_empty_export_has_no_rows() {
        let mut out = Vec::new();
        assert_eq!(write_skills_csv(&mut out, &[]).unwrap(), 0);
        assert!(out.is_empty());
    }
}
