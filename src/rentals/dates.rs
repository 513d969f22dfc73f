use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime,
};

use crate::error::ApiError;

pub(crate) const DATE_FMT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses a rental date input. Accepts a plain `YYYY-MM-DD` date (read as
/// midnight UTC) or an RFC 3339 timestamp.
fn parse_instant(input: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(ts);
    }
    if let Ok(date) = Date::parse(input, DATE_FMT) {
        return Some(PrimitiveDateTime::new(date, time::Time::MIDNIGHT).assume_utc());
    }
    None
}

/// Validates a rental window: both endpoints must parse and the start must
/// fall strictly before the end. The comparison happens on the parsed
/// instants; the returned pair is truncated to calendar dates, so a window
/// inside a single day collapses to equal dates.
pub fn validate_range(from: &str, to: &str) -> Result<(Date, Date), ApiError> {
    let start = parse_instant(from);
    let end = parse_instant(to);
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok((start.date(), end.date())),
        _ => Err(ApiError::InvalidInput("Invalid start or end date".into())),
    }
}

/// Serde adapter storing `time::Date` as a `YYYY-MM-DD` string in JSON.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::DATE_FMT;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let s = date.format(DATE_FMT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FMT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn accepts_ordered_calendar_dates() {
        let (start, end) = validate_range("2024-01-01", "2024-01-10").expect("valid range");
        assert_eq!(start, date!(2024 - 01 - 01));
        assert_eq!(end, date!(2024 - 01 - 10));
    }

    #[test]
    fn rejects_equal_dates() {
        assert!(validate_range("2024-01-01", "2024-01-01").is_err());
    }

    #[test]
    fn rejects_reversed_dates() {
        assert!(validate_range("2024-01-10", "2024-01-01").is_err());
    }

    #[test]
    fn rejects_unparseable_input() {
        assert!(validate_range("not-a-date", "2024-01-10").is_err());
        assert!(validate_range("2024-01-01", "soon").is_err());
        assert!(validate_range("", "").is_err());
    }

    #[test]
    fn timestamps_are_truncated_to_dates() {
        let (start, end) =
            validate_range("2024-01-01T15:30:00Z", "2024-01-10T08:00:00Z").expect("valid range");
        assert_eq!(start, date!(2024 - 01 - 01));
        assert_eq!(end, date!(2024 - 01 - 10));
    }

    #[test]
    fn same_day_window_collapses_to_equal_dates() {
        // Ordering is checked on the instants, then truncated
        let (start, end) =
            validate_range("2024-01-01T08:00:00Z", "2024-01-01T18:00:00Z").expect("valid range");
        assert_eq!(start, end);
    }

    #[test]
    fn iso_date_roundtrip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrap(#[serde(with = "super::iso_date")] time::Date);

        let json = serde_json::to_string(&Wrap(date!(2024 - 02 - 29))).unwrap();
        assert_eq!(json, r#""2024-02-29""#);
        let back: Wrap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.0, date!(2024 - 02 - 29));
    }
}
