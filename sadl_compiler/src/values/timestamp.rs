//! UTC timestamps rendered as RFC 3339 with millisecond precision

use super::ValueError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Zero-offset suffixes accepted in place of `Z`
const UTC_SUFFIXES: [&str; 4] = ["+00:00", "-00:00", "+0000", "-0000"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parse `YYYY-MM-DDTHH:MM:SS[.fff]Z`. A zero offset written as
    /// `+00:00`, `-00:00`, `+0000` or `-0000` is accepted for `Z`; any other
    /// offset is rejected.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let bad = || ValueError::BadTimestamp(text.to_string());

        let normalized = UTC_SUFFIXES
            .iter()
            .find_map(|suffix| text.strip_suffix(suffix))
            .map(|head| format!("{}Z", head))
            .unwrap_or_else(|| text.to_string());
        if !normalized.ends_with('Z') {
            return Err(bad());
        }

        DateTime::parse_from_rfc3339(&normalized)
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
            .map_err(|_| bad())
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Timestamp(datetime)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl FromStr for Timestamp {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millisecond_rendering() {
        let ts = Timestamp::parse("2019-03-01T12:30:45Z").unwrap();
        assert_eq!(ts.to_string(), "2019-03-01T12:30:45.000Z");

        let ts = Timestamp::parse("2019-03-01T12:30:45.5Z").unwrap();
        assert_eq!(ts.to_string(), "2019-03-01T12:30:45.500Z");
    }

    #[test]
    fn test_zero_offset_variants() {
        let expected = Timestamp::parse("2020-01-02T03:04:05.123Z").unwrap();
        for text in [
            "2020-01-02T03:04:05.123+00:00",
            "2020-01-02T03:04:05.123-00:00",
            "2020-01-02T03:04:05.123+0000",
            "2020-01-02T03:04:05.123-0000",
        ] {
            assert_eq!(Timestamp::parse(text).unwrap(), expected, "{}", text);
        }
    }

    #[test]
    fn test_rejections() {
        assert!(Timestamp::parse("2020-01-02T03:04:05+05:00").is_err());
        assert!(Timestamp::parse("2020-01-02").is_err());
        assert_eq!(
            Timestamp::parse("yesterday").unwrap_err().to_string(),
            "Bad Timestamp: \"yesterday\""
        );
    }

    #[test]
    fn test_json_form() {
        let ts = Timestamp::parse("2021-06-07T08:09:10.011Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2021-06-07T08:09:10.011Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
