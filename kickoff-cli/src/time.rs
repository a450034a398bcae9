//! Time display in the supporter's zone.

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse().map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Format a UTC departure like "Sat 14 Mar 12:00 GMT".
pub fn format_local(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%a %d %b %H:%M %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_london_summer_time() {
        // June is BST (UTC+1)
        let dt = Utc.with_ymd_and_hms(2026, 6, 13, 14, 0, 0).unwrap();
        let tz = parse_timezone("Europe/London").unwrap();
        assert_eq!(format_local(dt, tz), "Sat 13 Jun 15:00 BST");
    }

    #[test]
    fn test_invalid_timezone() {
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
