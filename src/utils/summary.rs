use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::attendance::AttendanceRecord;
use crate::utils::hours::{round2, span};

/// A record paired with its computed hours. `hours` stays `None` while the
/// session is open so callers can tell "no hours yet" from "worked 0.0".
#[derive(Debug)]
pub struct RecordHours {
    pub record: AttendanceRecord,
    pub hours: Option<f64>,
}

#[derive(Debug)]
pub struct MonthlySummary {
    pub total_hours: f64,
    pub work_days: usize,
    pub records: Vec<RecordHours>,
}

/// Aggregate a batch of records into per-record hours plus totals. Only
/// closed records contribute to `total_hours` and `work_days`; open sessions
/// are carried through with null hours. Each closed span is rounded before
/// summing and the sum rounded again, so totals match the per-record values
/// readers see.
pub fn aggregate(records: Vec<AttendanceRecord>) -> MonthlySummary {
    let mut total = 0.0;
    let mut days: HashSet<NaiveDate> = HashSet::new();
    let mut out = Vec::with_capacity(records.len());

    for record in records {
        let hours = match record.end_time {
            Some(_) => {
                let worked = span(record.start_time, record.end_time).value();
                total += worked;
                days.insert(record.date);
                Some(worked)
            }
            None => None,
        };
        out.push(RecordHours { record, hours });
    }

    MonthlySummary {
        total_hours: round2(total),
        work_days: days.len(),
        records: out,
    }
}

/// Aggregate only the records dated within `[first, last]` inclusive.
pub fn aggregate_within(
    records: Vec<AttendanceRecord>,
    first: NaiveDate,
    last: NaiveDate,
) -> MonthlySummary {
    let in_range = records
        .into_iter()
        .filter(|r| r.date >= first && r.date <= last)
        .collect();
    aggregate(in_range)
}

/// First and last day of the given month, or `None` for an invalid
/// year/month pair.
pub fn month_span(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next.pred_opt()?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn closed(d: u32, start: (u32, u32), end: (u32, u32)) -> AttendanceRecord {
        AttendanceRecord {
            date: day(d),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0),
            location: None,
        }
    }

    fn open(d: u32, start: (u32, u32)) -> AttendanceRecord {
        AttendanceRecord {
            date: day(d),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0),
            end_time: None,
            location: None,
        }
    }

    #[test]
    fn empty_batch_sums_to_zero() {
        let summary = aggregate(Vec::new());
        assert_eq!(summary.total_hours, 0.0);
        assert_eq!(summary.work_days, 0);
        assert!(summary.records.is_empty());
    }

    #[test]
    fn all_open_batch_counts_no_work_days() {
        let summary = aggregate(vec![open(3, (8, 0)), open(4, (8, 0))]);
        assert_eq!(summary.total_hours, 0.0);
        assert_eq!(summary.work_days, 0);
        assert!(summary.records.iter().all(|r| r.hours.is_none()));
    }

    #[test]
    fn split_shifts_on_one_day_count_once() {
        let summary = aggregate(vec![
            closed(5, (8, 0), (16, 0)),
            closed(5, (17, 0), (18, 0)),
        ]);
        assert_eq!(summary.total_hours, 9.0);
        assert_eq!(summary.work_days, 1);
        assert_eq!(summary.records[0].hours, Some(8.0));
        assert_eq!(summary.records[1].hours, Some(1.0));
    }

    #[test]
    fn open_session_excluded_from_totals() {
        let summary = aggregate(vec![closed(3, (9, 0), (17, 0)), open(4, (9, 0))]);
        assert_eq!(summary.total_hours, 8.0);
        assert_eq!(summary.work_days, 1);
        assert_eq!(summary.records[0].hours, Some(8.0));
        assert_eq!(summary.records[1].hours, None);
    }

    #[test]
    fn zero_duration_day_still_counts_as_work_day() {
        let summary = aggregate(vec![closed(3, (9, 0), (9, 0))]);
        assert_eq!(summary.total_hours, 0.0);
        assert_eq!(summary.work_days, 1);
        assert_eq!(summary.records[0].hours, Some(0.0));
    }

    #[test]
    fn per_record_rounding_feeds_the_total() {
        // Three 50-minute spans round to 0.83 each, so the total is 2.49
        // rather than round(150 / 60) = 2.5.
        let summary = aggregate(vec![
            closed(3, (9, 0), (9, 50)),
            closed(4, (9, 0), (9, 50)),
            closed(5, (9, 0), (9, 50)),
        ]);
        assert_eq!(summary.total_hours, 2.49);
        assert_eq!(summary.work_days, 3);
    }

    #[test]
    fn work_days_never_exceed_closed_record_count() {
        let records = vec![
            closed(3, (8, 0), (12, 0)),
            closed(3, (13, 0), (17, 0)),
            closed(4, (8, 0), (16, 0)),
            open(5, (8, 0)),
        ];
        let closed_count = records.iter().filter(|r| r.end_time.is_some()).count();
        let summary = aggregate(records);
        assert!(summary.work_days <= closed_count);
        assert_eq!(summary.work_days, 2);
    }

    #[test]
    fn range_filter_is_inclusive() {
        let summary = aggregate_within(
            vec![
                closed(1, (9, 0), (17, 0)),
                closed(15, (9, 0), (17, 0)),
                closed(31, (9, 0), (17, 0)),
            ],
            day(1),
            day(31),
        );
        assert_eq!(summary.records.len(), 3);
        assert_eq!(summary.total_hours, 24.0);
    }

    #[test]
    fn out_of_range_records_are_dropped() {
        let feb = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let april = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let mut records = vec![closed(10, (9, 0), (17, 0))];
        records.push(AttendanceRecord {
            date: feb,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
            location: None,
        });
        records.push(AttendanceRecord {
            date: april,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
            location: None,
        });

        let summary = aggregate_within(records, day(1), day(31));
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.total_hours, 8.0);
        assert_eq!(summary.work_days, 1);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let records = || {
            vec![
                closed(3, (8, 0), (12, 30)),
                closed(4, (9, 15), (17, 45)),
                open(5, (8, 0)),
            ]
        };
        let a = aggregate(records());
        let b = aggregate(records());
        assert_eq!(a.total_hours, b.total_hours);
        assert_eq!(a.work_days, b.work_days);
    }

    #[test]
    fn month_span_handles_december_and_leap_years() {
        let (first, last) = month_span(2025, 12).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());

        let (_, feb_last) = month_span(2024, 2).unwrap();
        assert_eq!(feb_last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn month_span_rejects_invalid_month() {
        assert!(month_span(2025, 0).is_none());
        assert!(month_span(2025, 13).is_none());
    }
}
