use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde_json::Value;

use crate::prelude::*;

/// The single condition a badge is unlocked by.
///
/// Catalogs spell it as a one-entry object such as `{"stopped": 25}` or `{"night_visit": true}`; anything else is rejected when the catalog is parsed,
/// so the evaluator only ever sees well-formed criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCriteria", into = "RawCriteria")]
pub enum Criterion {
    /// Stopped at `n` distinct stations.
    Stopped(NonZeroU32),
    /// Passed through `n` distinct stations.
    Passed(NonZeroU32),
    /// Stopped at every station of `n` lines.
    LineComplete(NonZeroU32),
    /// Stopped at every station of the network.
    AllStations,
    /// A first stop between 22:00 and 05:59 local time.
    NightVisit,
    /// A first stop between 06:00 and 08:59 local time.
    EarlyVisit,
    /// `n` first stops on the same local calendar day.
    DailyMarathon(NonZeroU32),
    /// Passed through `n` stations of a single line.
    LinePassedSame(NonZeroU32),
    /// Holding an account.
    AccountCreated,
}

const STOPPED: &str = "stopped";
const PASSED: &str = "passed";
const LINE_COMPLETE: &str = "line_complete";
const ALL_STATIONS: &str = "all_stations";
const NIGHT_VISIT: &str = "night_visit";
const EARLY_VISIT: &str = "early_visit";
const DAILY_MARATHON: &str = "daily_marathon";
const LINE_PASSED_SAME: &str = "line_passed_same";
const ACCOUNT_CREATED: &str = "account_created";

impl Criterion {
    pub fn kind(&self) -> &'static str {
        match self {
            Criterion::Stopped(_) => STOPPED,
            Criterion::Passed(_) => PASSED,
            Criterion::LineComplete(_) => LINE_COMPLETE,
            Criterion::AllStations => ALL_STATIONS,
            Criterion::NightVisit => NIGHT_VISIT,
            Criterion::EarlyVisit => EARLY_VISIT,
            Criterion::DailyMarathon(_) => DAILY_MARATHON,
            Criterion::LinePassedSame(_) => LINE_PASSED_SAME,
            Criterion::AccountCreated => ACCOUNT_CREATED,
        }
    }

    /// The threshold of a countable criterion.
    pub fn threshold(&self) -> Option<NonZeroU32> {
        match self {
            Criterion::Stopped(n)
            | Criterion::Passed(n)
            | Criterion::LineComplete(n)
            | Criterion::DailyMarathon(n)
            | Criterion::LinePassedSame(n) => Some(*n),
            Criterion::AllStations
            | Criterion::NightVisit
            | Criterion::EarlyVisit
            | Criterion::AccountCreated => None,
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.threshold() {
            Some(n) => write!(f, "{} >= {n}", self.kind()),
            None => f.write_str(self.kind()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum InvalidCriteria {
    #[snafu(display("criteria must have exactly one entry, found {count}"))]
    EntryCount { count: usize },

    #[snafu(display("unknown criteria `{kind}`"))]
    UnknownKind { kind: String },

    #[snafu(display("criteria `{kind}` expects a positive integer, found `{value}`"))]
    NotAPositiveCount { kind: String, value: String },

    #[snafu(display("criteria `{kind}` expects `true`, found `{value}`"))]
    NotAFlag { kind: String, value: String },
}

/// The loosely-typed shape criteria are stored and exchanged in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCriteria(pub BTreeMap<String, Value>);

impl TryFrom<RawCriteria> for Criterion {
    type Error = InvalidCriteria;

    fn try_from(RawCriteria(entries): RawCriteria) -> Result<Self, Self::Error> {
        if entries.len() != 1 {
            return EntryCountSnafu {
                count: entries.len(),
            }
            .fail();
        }

        let Some((kind, value)) = entries.into_iter().next() else {
            return EntryCountSnafu { count: 0usize }.fail();
        };

        let criterion = match kind.as_str() {
            STOPPED => Criterion::Stopped(count(&kind, &value)?),
            PASSED => Criterion::Passed(count(&kind, &value)?),
            LINE_COMPLETE => Criterion::LineComplete(count(&kind, &value)?),
            DAILY_MARATHON => Criterion::DailyMarathon(count(&kind, &value)?),
            LINE_PASSED_SAME => Criterion::LinePassedSame(count(&kind, &value)?),
            ALL_STATIONS => flag(&kind, &value, Criterion::AllStations)?,
            NIGHT_VISIT => flag(&kind, &value, Criterion::NightVisit)?,
            EARLY_VISIT => flag(&kind, &value, Criterion::EarlyVisit)?,
            ACCOUNT_CREATED => flag(&kind, &value, Criterion::AccountCreated)?,
            _ => return UnknownKindSnafu { kind }.fail(),
        };

        Ok(criterion)
    }
}

fn count(kind: &str, value: &Value) -> Result<NonZeroU32, InvalidCriteria> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .and_then(NonZeroU32::new)
        .context(NotAPositiveCountSnafu {
            kind,
            value: value.to_string(),
        })
}

fn flag(kind: &str, value: &Value, criterion: Criterion) -> Result<Criterion, InvalidCriteria> {
    match value {
        Value::Bool(true) => Ok(criterion),
        _ => NotAFlagSnafu {
            kind,
            value: value.to_string(),
        }
        .fail(),
    }
}

impl From<Criterion> for RawCriteria {
    fn from(criterion: Criterion) -> Self {
        let value = match criterion.threshold() {
            Some(n) => Value::from(n.get()),
            None => Value::Bool(true),
        };

        RawCriteria(BTreeMap::from([(criterion.kind().to_string(), value)]))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> Result<Criterion, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn n(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn parses_every_catalog_kind() {
        assert_eq!(parse(json!({"stopped": 25})).unwrap(), Criterion::Stopped(n(25)));
        assert_eq!(parse(json!({"passed": 10})).unwrap(), Criterion::Passed(n(10)));
        assert_eq!(parse(json!({"line_complete": 3})).unwrap(), Criterion::LineComplete(n(3)));
        assert_eq!(parse(json!({"all_stations": true})).unwrap(), Criterion::AllStations);
        assert_eq!(parse(json!({"night_visit": true})).unwrap(), Criterion::NightVisit);
        assert_eq!(parse(json!({"early_visit": true})).unwrap(), Criterion::EarlyVisit);
        assert_eq!(parse(json!({"daily_marathon": 10})).unwrap(), Criterion::DailyMarathon(n(10)));
        assert_eq!(parse(json!({"line_passed_same": 20})).unwrap(), Criterion::LinePassedSame(n(20)));
        assert_eq!(parse(json!({"account_created": true})).unwrap(), Criterion::AccountCreated);
    }

    #[test]
    fn rejects_malformed_criteria() {
        assert!(parse(json!({})).is_err(), "no entry");
        assert!(parse(json!({"stopped": 1, "passed": 1})).is_err(), "two entries");
        assert!(parse(json!({"stopped": 0})).is_err(), "zero threshold");
        assert!(parse(json!({"stopped": -3})).is_err(), "negative threshold");
        assert!(parse(json!({"stopped": "25"})).is_err(), "stringly threshold");
        assert!(parse(json!({"night_visit": false})).is_err(), "disabled flag");
        assert!(parse(json!({"teleported": true})).is_err(), "unknown kind");
    }

    #[test]
    fn serializes_back_to_the_catalog_shape() {
        assert_eq!(
            serde_json::to_value(Criterion::DailyMarathon(n(10))).unwrap(),
            json!({"daily_marathon": 10})
        );
        assert_eq!(
            serde_json::to_value(Criterion::AccountCreated).unwrap(),
            json!({"account_created": true})
        );
    }

    #[test]
    fn raw_errors_explain_the_problem() {
        let raw = RawCriteria(BTreeMap::from([("stopped".to_string(), json!(0))]));
        let error = Criterion::try_from(raw).unwrap_err();

        assert_eq!(
            error.to_string(),
            "criteria `stopped` expects a positive integer, found `0`"
        );
    }
}
