use chrono::{NaiveTime, Timelike};

/// Outcome of a worked-hours computation. `degraded` marks spans that could
/// not be computed from their inputs; they carry zero hours and never fail
/// the surrounding listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoursResult {
    hours: f64,
    degraded: bool,
}

impl HoursResult {
    pub fn computed(hours: f64) -> Self {
        Self {
            hours,
            degraded: false,
        }
    }

    pub fn degraded() -> Self {
        Self {
            hours: 0.0,
            degraded: true,
        }
    }

    pub fn value(&self) -> f64 {
        self.hours
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Round to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse a clock value in `HH:MM` form. Longer strings such as `08:30:00`
/// are accepted by reading only the leading five characters, so seconds
/// never influence the result.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    let head = trimmed.get(..5).unwrap_or(trimmed);
    NaiveTime::parse_from_str(head, "%H:%M").ok()
}

/// Format a clock value as `HH:MM`, dropping seconds.
pub fn format_clock(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Hours between two clock readings at minute precision. An end before the
/// start is treated as an overnight shift crossing midnight. Missing
/// readings yield a degraded zero result.
pub fn span(start: Option<NaiveTime>, end: Option<NaiveTime>) -> HoursResult {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return HoursResult::degraded(),
    };

    let start_min = (start.hour() * 60 + start.minute()) as i64;
    let end_min = (end.hour() * 60 + end.minute()) as i64;

    let mut worked = end_min - start_min;
    if worked < 0 {
        worked += 24 * 60;
    }

    HoursResult::computed(round2(worked as f64 / 60.0))
}

/// Same as [`span`] but over raw clock strings, as received from clients or
/// legacy rows. Unparseable input degrades instead of erroring.
pub fn span_str(start: &str, end: &str) -> HoursResult {
    match (parse_clock(start), parse_clock(end)) {
        (Some(s), Some(e)) => span(Some(s), Some(e)),
        _ => HoursResult::degraded(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn regular_shift() {
        let result = span(clock(9, 0), clock(17, 0));
        assert_eq!(result.value(), 8.0);
        assert!(!result.is_degraded());
    }

    #[test]
    fn overnight_shift_crosses_midnight() {
        let result = span(clock(22, 0), clock(6, 0));
        assert_eq!(result.value(), 8.0);
        assert!(!result.is_degraded());
    }

    #[test]
    fn fractional_hours_round_to_two_decimals() {
        assert_eq!(span(clock(8, 15), clock(8, 45)).value(), 0.5);
        assert_eq!(span(clock(9, 0), clock(9, 50)).value(), 0.83);
    }

    #[test]
    fn zero_span_is_computed_not_degraded() {
        let result = span(clock(9, 0), clock(9, 0));
        assert_eq!(result.value(), 0.0);
        assert!(!result.is_degraded());
    }

    #[test]
    fn missing_reading_degrades() {
        assert!(span(clock(9, 0), None).is_degraded());
        assert!(span(None, clock(17, 0)).is_degraded());
        assert_eq!(span(None, None).value(), 0.0);
    }

    #[test]
    fn seconds_are_ignored() {
        let result = span_str("08:00:45", "16:00:12");
        assert_eq!(result.value(), 8.0);
        assert!(!result.is_degraded());
    }

    #[test]
    fn whitespace_is_tolerated() {
        assert_eq!(span_str(" 08:00 ", "12:15 ").value(), 4.25);
    }

    #[test]
    fn garbage_input_degrades_to_zero() {
        let result = span_str("soon", "late");
        assert_eq!(result.value(), 0.0);
        assert!(result.is_degraded());
    }

    #[test]
    fn parse_rejects_out_of_range_clock() {
        assert!(parse_clock("25:00").is_none());
        assert!(parse_clock("09:61").is_none());
    }

    #[test]
    fn format_drops_seconds() {
        let t = NaiveTime::from_hms_opt(7, 5, 59).unwrap();
        assert_eq!(format_clock(&t), "07:05");
    }
}
