//! Timestamp rendering shared by every entity that records a registration date.

use chrono::{DateTime, Utc};

/// Layout used for registration dates in API payloads.
pub const REGISTRATION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a registration timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_registration_date(at: DateTime<Utc>) -> String {
    at.format(REGISTRATION_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn renders_seconds_precision_without_zone() {
        let at = Utc.with_ymd_and_hms(2017, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_registration_date(at), "2017-03-09 07:05:01");
    }
}
