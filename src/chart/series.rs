//! Series Preparation
//!
//! Turns raw transactions into chartable values: running totals over time
//! for the progress chart and per-key aggregates for the bar chart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::client::Transaction;

/// Prefix stripped from skill transaction types to obtain the bar label
pub const SKILL_PREFIX: &str = "skill_";

/// How successive amounts combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Add amounts (running total)
    #[default]
    Sum,
    /// Keep the largest amount (best attempt)
    Max,
}

impl Aggregation {
    /// Fold one more amount into an accumulated value
    pub fn combine(self, acc: f64, amount: f64) -> f64 {
        match self {
            Aggregation::Sum => acc + amount,
            Aggregation::Max => acc.max(amount),
        }
    }
}

/// Accumulated value after one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TimedValue {
    pub timestamp: DateTime<Utc>,
    /// The transaction's own amount
    pub amount: f64,
    /// Accumulated value up to and including this transaction
    pub value: f64,
}

/// A plotted point in pixel space, relative to the drawable area
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub value: f64,
}

/// Accumulate amounts in input order, one value per timestamped record.
///
/// Records without `createdAt` are skipped. The caller provides records
/// sorted by time.
pub fn running(records: &[Transaction], aggregation: Aggregation) -> Vec<TimedValue> {
    let mut acc: Option<f64> = None;

    records
        .iter()
        .filter_map(|record| {
            let timestamp = record.created_at?;
            let value = match acc {
                Some(previous) => aggregation.combine(previous, record.amount),
                None => record.amount,
            };
            acc = Some(value);
            Some(TimedValue {
                timestamp,
                amount: record.amount,
                value,
            })
        })
        .collect()
}

/// Bar label for a transaction type
pub fn skill_key(kind: &str) -> &str {
    kind.strip_prefix(SKILL_PREFIX).unwrap_or(kind)
}

/// Aggregate amounts per skill key, largest first.
///
/// Ties keep first-encountered order. Records without a type are skipped.
pub fn grouped(records: &[Transaction], aggregation: Aggregation) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(kind) = record.kind.as_deref() else {
            continue;
        };
        let key = skill_key(kind);

        match index.get(key) {
            Some(&i) => {
                let slot = &mut groups[i].1;
                *slot = aggregation.combine(*slot, record.amount);
            }
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push((key.to_string(), record.amount));
            }
        }
    }

    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn xp_series(amounts: &[f64]) -> Vec<Transaction> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| Transaction::xp(amount, start + Duration::days(i as i64)))
            .collect()
    }

    #[test]
    fn test_running_sum() {
        let amounts = [1000.0, 250.0, 0.0, 4750.0, 12.5];
        let series = running(&xp_series(&amounts), Aggregation::Sum);

        assert_eq!(series.len(), amounts.len());
        for pair in series.windows(2) {
            assert!(pair[1].value >= pair[0].value);
        }
        assert_eq!(series.last().unwrap().value, amounts.iter().sum::<f64>());
    }

    #[test]
    fn test_running_max() {
        let series = running(&xp_series(&[5.0, 9.0, 3.0]), Aggregation::Max);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![5.0, 9.0, 9.0]);
    }

    #[test]
    fn test_running_skips_undated() {
        let mut records = xp_series(&[10.0, 20.0]);
        records.insert(1, Transaction::skill("xp", 99.0));

        let series = running(&records, Aggregation::Sum);
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].value, 30.0);
    }

    #[test]
    fn test_skill_key() {
        assert_eq!(skill_key("skill_go"), "go");
        assert_eq!(skill_key("skill_front-end"), "front-end");
        assert_eq!(skill_key("xp"), "xp");
    }

    #[test]
    fn test_grouped_takes_maximum() {
        let records = vec![
            Transaction::skill("skill_go", 30.0),
            Transaction::skill("skill_js", 40.0),
            Transaction::skill("skill_go", 55.0),
            Transaction::skill("skill_go", 5.0),
        ];

        let groups = grouped(&records, Aggregation::Max);
        assert_eq!(groups, vec![("go".to_string(), 55.0), ("js".to_string(), 40.0)]);
    }

    #[test]
    fn test_grouped_sum_when_configured() {
        let records = vec![
            Transaction::skill("skill_go", 30.0),
            Transaction::skill("skill_go", 55.0),
        ];

        assert_eq!(grouped(&records, Aggregation::Sum), vec![("go".to_string(), 85.0)]);
    }

    #[test]
    fn test_grouped_ties_keep_encounter_order() {
        let records = vec![
            Transaction::skill("skill_algo", 50.0),
            Transaction::skill("skill_prog", 70.0),
            Transaction::skill("skill_go", 50.0),
            Transaction::skill("skill_back-end", 50.0),
        ];

        let keys: Vec<String> = grouped(&records, Aggregation::Max)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["prog", "algo", "go", "back-end"]);
    }
}
