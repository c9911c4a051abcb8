//! Timestamp rendering shared by the corrector, loggers and CLI.

use std::time::SystemTime;

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Human-readable local time, `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_local(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// RFC 3339 UTC with millisecond precision, for machine-readable output.
#[must_use]
pub fn format_rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current UTC time as RFC 3339.
#[must_use]
pub fn format_utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn rfc3339_is_utc_millis() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_millis(1_588_291_200_250);
        assert_eq!(format_rfc3339(t), "2020-05-01T00:00:00.250Z");
    }

    #[test]
    fn local_format_matches_local_calendar() {
        let local = Local
            .with_ymd_and_hms(2020, 5, 1, 13, 45, 6)
            .earliest()
            .expect("valid local time");
        assert_eq!(format_local(SystemTime::from(local)), "2020-05-01 13:45:06");
    }
}
