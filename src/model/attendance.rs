use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::hours::format_clock;

/// Placeholder shown whenever a record carries no usable location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// One check-in/check-out row as fetched for listings and aggregation.
/// A missing `end_time` marks an open session (checked in, not out yet).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
}

/// Resolve an optional location to its display form. The stored value keeps
/// its optional semantics; the substitution happens only here, at the
/// presentation boundary.
pub fn display_location(location: Option<&str>) -> String {
    match location.map(str::trim) {
        Some(loc) if !loc.is_empty() => loc.to_string(),
        _ => UNKNOWN_LOCATION.to_string(),
    }
}

/// Presentation form of an attendance record: clock values formatted as
/// `HH:MM`, location placeholder applied, hours null while the session is
/// still open.
#[derive(Debug, Serialize, ToSchema)]
#[schema(
    example = json!({
        "date": "2025-01-05",
        "start_time": "08:00",
        "end_time": "16:00",
        "location": "Berlin office",
        "hours": 8.0
    })
)]
pub struct AttendanceView {
    #[schema(example = "2025-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "08:00", nullable = true)]
    pub start_time: Option<String>,

    #[schema(example = "16:00", nullable = true)]
    pub end_time: Option<String>,

    #[schema(example = "Berlin office")]
    pub location: String,

    #[schema(example = 8.0, nullable = true)]
    pub hours: Option<f64>,
}

impl AttendanceView {
    pub fn new(record: &AttendanceRecord, hours: Option<f64>) -> Self {
        Self {
            date: record.date,
            start_time: record.start_time.map(|t| format_clock(&t)),
            end_time: record.end_time.map(|t| format_clock(&t)),
            location: display_location(record.location.as_deref()),
            hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0),
            end_time: None,
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn missing_location_displays_placeholder() {
        assert_eq!(display_location(None), UNKNOWN_LOCATION);
        assert_eq!(display_location(Some("")), UNKNOWN_LOCATION);
        assert_eq!(display_location(Some("   ")), UNKNOWN_LOCATION);
    }

    #[test]
    fn present_location_is_trimmed_not_replaced() {
        assert_eq!(display_location(Some(" Berlin office ")), "Berlin office");
    }

    #[test]
    fn view_formats_clocks_and_keeps_open_hours_null() {
        let view = AttendanceView::new(&record(None), None);
        assert_eq!(view.start_time.as_deref(), Some("08:00"));
        assert_eq!(view.end_time, None);
        assert_eq!(view.location, UNKNOWN_LOCATION);
        assert_eq!(view.hours, None);
    }

    #[test]
    fn view_keeps_zero_hours_distinct_from_open() {
        let view = AttendanceView::new(&record(Some("Warehouse")), Some(0.0));
        assert_eq!(view.hours, Some(0.0));
        assert_eq!(view.location, "Warehouse");
    }
}
