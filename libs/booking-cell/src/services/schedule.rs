// libs/booking-cell/src/services/schedule.rs
//
// Pure time helpers for the booking rules. The hour-truncated timestamp is
// the canonical availability key: two requests inside the same hour collide.
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// Truncate to the beginning of the containing hour.
pub fn hour_start(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        .unwrap_or(ts)
}

/// Strict ordering comparison.
pub fn is_before(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a < b
}

pub fn subtract_hours(ts: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    ts - Duration::hours(hours)
}

/// Human language for notification text. An explicit argument everywhere,
/// never global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Pt,
    En,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "en" => Locale::En,
            _ => Locale::Pt,
        }
    }

    pub fn new_booking_message(&self, customer_name: &str, formatted_date: &str) -> String {
        match self {
            Locale::Pt => format!("Novo agendamento de {} para {}", customer_name, formatted_date),
            Locale::En => format!("New booking from {} for {}", customer_name, formatted_date),
        }
    }
}

const MONTHS_PT: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho",
    "julho", "agosto", "setembro", "outubro", "novembro", "dezembro",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Locale-aware human rendering, e.g. "dia 12 de março, às 14:00h".
pub fn format_human(ts: DateTime<Utc>, locale: Locale) -> String {
    let month = (ts.month0() as usize).min(11);
    match locale {
        Locale::Pt => format!(
            "dia {} de {}, às {}:{:02}h",
            ts.day(),
            MONTHS_PT[month],
            ts.hour(),
            ts.minute()
        ),
        Locale::En => format!(
            "{} {} at {}:{:02}",
            MONTHS_EN[month],
            ts.day(),
            ts.hour(),
            ts.minute()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn hour_start_truncates_to_containing_hour() {
        let full = ts(2025, 6, 10, 14, 37, 52);
        assert_eq!(hour_start(full), ts(2025, 6, 10, 14, 0, 0));
    }

    #[test]
    fn hour_start_is_idempotent() {
        let slot = ts(2025, 6, 10, 14, 0, 0);
        assert_eq!(hour_start(slot), slot);
    }

    #[test]
    fn two_times_in_same_hour_share_a_slot() {
        let a = ts(2025, 6, 10, 14, 30, 0);
        let b = ts(2025, 6, 10, 14, 45, 0);
        assert_eq!(hour_start(a), hour_start(b));
    }

    #[test]
    fn is_before_is_strict() {
        let a = ts(2025, 6, 10, 14, 0, 0);
        assert!(is_before(a, ts(2025, 6, 10, 15, 0, 0)));
        assert!(!is_before(a, a));
        assert!(!is_before(ts(2025, 6, 10, 15, 0, 0), a));
    }

    #[test]
    fn subtract_hours_moves_backwards() {
        let slot = ts(2025, 6, 10, 14, 30, 0);
        assert_eq!(subtract_hours(slot, 2), ts(2025, 6, 10, 12, 30, 0));
    }

    #[test]
    fn formats_portuguese() {
        let slot = ts(2025, 3, 12, 14, 0, 0);
        assert_eq!(format_human(slot, Locale::Pt), "dia 12 de março, às 14:00h");
    }

    #[test]
    fn formats_english() {
        let slot = ts(2025, 3, 12, 14, 0, 0);
        assert_eq!(format_human(slot, Locale::En), "March 12 at 14:00");
    }

    #[test]
    fn locale_tag_defaults_to_portuguese() {
        assert_eq!(Locale::from_tag("en"), Locale::En);
        assert_eq!(Locale::from_tag("pt"), Locale::Pt);
        assert_eq!(Locale::from_tag("anything-else"), Locale::Pt);
    }
}
