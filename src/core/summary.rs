use crate::domain::model::TimeLog;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub sessions: usize,
    pub seconds: i64,
}

impl DailyTotal {
    pub fn hours(&self) -> f64 {
        self.seconds as f64 / 3600.0
    }
}

/// Per-day totals of closed logs, keyed by the UTC check-in date and sorted
/// by date. Open sessions and rejected logs are skipped.
pub fn daily_totals(logs: &[TimeLog]) -> Vec<DailyTotal> {
    let mut totals: BTreeMap<NaiveDate, (usize, i64)> = BTreeMap::new();

    for log in logs {
        if log.status == crate::domain::model::TimeLogStatus::Rejected {
            continue;
        }
        let Some(duration) = log.duration() else {
            continue;
        };
        let entry = totals.entry(log.check_in.date_naive()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += duration.num_seconds().max(0);
    }

    totals
        .into_iter()
        .map(|(date, (sessions, seconds))| DailyTotal {
            date,
            sessions,
            seconds,
        })
        .collect()
}

pub fn total_hours(totals: &[DailyTotal]) -> f64 {
    totals.iter().map(DailyTotal::hours).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TimeLogStatus;

    fn log(id: i64, check_in: &str, check_out: Option<&str>) -> TimeLog {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "user_id": 1,
            "check_in": check_in,
            "check_out": check_out,
        }))
        .unwrap()
    }

    #[test]
    fn groups_closed_logs_by_day() {
        let logs = vec![
            log(3, "2026-10-02T09:00:00Z", Some("2026-10-02T12:00:00Z")),
            log(1, "2026-10-01T09:00:00Z", Some("2026-10-01T13:00:00Z")),
            log(2, "2026-10-01T14:00:00Z", Some("2026-10-01T18:30:00Z")),
            log(4, "2026-10-03T09:00:00Z", None),
        ];

        let totals = daily_totals(&logs);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(totals[0].sessions, 2);
        assert!((totals[0].hours() - 8.5).abs() < 0.001);
        assert!((total_hours(&totals) - 11.5).abs() < 0.001);
    }

    #[test]
    fn rejected_logs_do_not_count() {
        let mut rejected = log(1, "2026-10-01T09:00:00Z", Some("2026-10-01T17:00:00Z"));
        rejected.status = TimeLogStatus::Rejected;
        assert!(daily_totals(&[rejected]).is_empty());
    }

    #[test]
    fn empty_input_gives_no_days() {
        assert!(daily_totals(&[]).is_empty());
        assert_eq!(total_hours(&[]), 0.0);
    }
}
