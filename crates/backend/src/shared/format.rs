use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// IST, UTC+5:30. Business days and hours are counted in this zone.
pub const IST_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

pub fn to_local(dt: DateTime<Utc>) -> NaiveDateTime {
    (dt + Duration::seconds(IST_OFFSET_SECS)).naive_utc()
}

/// Formats a number with dots between thousands groups
///
/// `format_number(1234567)` gives `"1.234.567"`.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
        assert_eq!(format_number(1234567890), "1.234.567.890");
    }

    #[test]
    fn test_to_local_crosses_midnight() {
        let utc = DateTime::parse_from_rfc3339("2025-01-14T19:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let local = to_local(utc);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2025-01-15 00:30");
    }
}
