use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset as _, Timelike as _, Utc};
use serde::{Deserialize, Serialize};

pub fn now() -> Timestamp {
    Timestamp(Utc::now())
}

/// A UTC instant, stored as an RFC 3339 string so it survives the round trip through the database unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_rfc3339().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// The server's local wall clock, used whenever a visit is bucketed by hour of day or calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTime {
    /// The host's time zone, daylight saving included. Each instant gets the offset in force at that instant.
    Host,
    Fixed(FixedOffset),
}

impl LocalTime {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    pub fn host() -> Self {
        Self::Host
    }

    /// Returns `None` when the offset is a day or more away from UTC.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        let seconds = minutes.checked_mul(60)?;
        FixedOffset::east_opt(seconds).map(Self::Fixed)
    }

    pub fn local(self, timestamp: Timestamp) -> DateTime<FixedOffset> {
        match self {
            LocalTime::Host => {
                let local = timestamp.0.with_timezone(&Local);
                let offset = *local.offset();
                local.with_timezone(&offset)
            }
            LocalTime::Fixed(offset) => timestamp.0.with_timezone(&offset),
        }
    }

    pub fn hour(self, timestamp: Timestamp) -> u32 {
        self.local(timestamp).hour()
    }

    pub fn day(self, timestamp: Timestamp) -> NaiveDate {
        self.local(timestamp).date_naive()
    }
}

#[cfg(test)]
pub(crate) fn at(rfc3339: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid rfc3339 timestamp")
        .with_timezone(&Utc)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_hour_follows_the_offset() {
        let paris = LocalTime::from_offset_minutes(60).unwrap();
        let timestamp = at("2024-03-01T23:30:00Z");

        assert_eq!(LocalTime::utc().hour(timestamp), 23);
        assert_eq!(paris.hour(timestamp), 0);
        assert_eq!(
            paris.day(timestamp),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            "a visit just before midnight UTC belongs to the next local day"
        );
    }

    // Only test that reads the host zone, so changing TZ here cannot disturb the others.
    #[test]
    fn host_clock_follows_daylight_saving() {
        let previous = std::env::var("TZ").ok();
        std::env::set_var("TZ", "Europe/Paris");

        let winter = at("2024-01-15T04:30:00Z");
        let summer = at("2024-07-15T04:30:00Z");
        let (winter_hour, summer_hour) = (LocalTime::host().hour(winter), LocalTime::host().hour(summer));

        match previous {
            Some(zone) => std::env::set_var("TZ", zone),
            None => std::env::remove_var("TZ"),
        }

        assert_eq!(winter_hour, 5, "05:30 CET is still night");
        assert_eq!(summer_hour, 6, "06:30 CEST is early");
    }

    #[test]
    fn offsets_beyond_a_day_are_rejected() {
        assert!(LocalTime::from_offset_minutes(24 * 60).is_none());
        assert!(LocalTime::from_offset_minutes(-5 * 60).is_some());
    }

    #[test]
    fn timestamps_keep_sub_second_precision() {
        let timestamp = at("2024-03-01T07:00:00.123456789Z");
        let json = serde_json::to_string(&timestamp).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, timestamp);
    }
}
