use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::network::Network;
use crate::prelude::*;

/// First stops in these local hours unlock `night_visit`.
pub fn is_night(hour: u32) -> bool {
    hour >= 22 || hour <= 5
}

/// First stops in these local hours unlock `early_visit`.
pub fn is_early(hour: u32) -> bool {
    (6..=8).contains(&hour)
}

/// Everything a user's badges are judged on, computed in a single pass over their station states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub passed: u32,
    pub stopped: u32,
    pub total_stations: u32,
    /// Lines with at least one station, all of them stopped at.
    pub completed_lines: u32,
    pub max_passed_on_a_line: u32,
    pub max_stopped_in_a_day: u32,
    pub night_visit: bool,
    pub early_visit: bool,
}

impl Aggregates {
    pub fn compute(network: &Network, states: &[StationState], clock: LocalTime) -> Self {
        let mut aggregates = Aggregates {
            total_stations: network.total_stations(),
            ..Default::default()
        };

        let mut passed_per_line: HashMap<&Record<Line>, u32> = HashMap::new();
        let mut stopped_per_line: HashMap<&Record<Line>, u32> = HashMap::new();
        let mut stops_per_day: HashMap<NaiveDate, u32> = HashMap::new();

        for state in states {
            let line = network.line_of(&state.station);

            if state.passed {
                aggregates.passed += 1;
                if let Some(line) = line {
                    *passed_per_line.entry(line).or_default() += 1;
                }
            }

            if state.stopped {
                aggregates.stopped += 1;
                if let Some(line) = line {
                    *stopped_per_line.entry(line).or_default() += 1;
                }
            }

            // A station that was un-stopped later still keeps its first stop.
            if let Some(first_stop) = state.first_stopped_at {
                let hour = clock.hour(first_stop);
                aggregates.night_visit |= is_night(hour);
                aggregates.early_visit |= is_early(hour);
                *stops_per_day.entry(clock.day(first_stop)).or_default() += 1;
            }
        }

        let completed = network.lines().iter().filter(|line| {
            let total = network.station_count(&line.id);
            let stopped = stopped_per_line.get(&line.id).copied().unwrap_or_default();
            total > 0 && stopped >= total
        });

        aggregates.completed_lines = u32::try_from(completed.count()).unwrap_or(u32::MAX);
        aggregates.max_passed_on_a_line = passed_per_line.into_values().max().unwrap_or_default();
        aggregates.max_stopped_in_a_day = stops_per_day.into_values().max().unwrap_or_default();

        aggregates
    }
}

/// A user's complete view of the world at one instant: the network, their station states, the badge catalog and what they already earned.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub network: Network,
    pub states: Vec<StationState>,
    pub catalog: Vec<Badge>,
    pub earned: HashSet<Record<Badge>>,
}

impl Snapshot {
    #[tracing::instrument(level = "debug", skip(db))]
    pub async fn load(user: &Record<User>, db: &Database) -> Result<Self, DatabaseQueryError> {
        let (network, states, catalog, awards) = tokio::try_join!(
            Network::load(db),
            StationState::for_user(user, db),
            Badge::catalog(db),
            BadgeAward::for_user(user, db),
        )?;

        Ok(Self {
            network,
            states,
            catalog,
            earned: awards.into_iter().map(|award| award.badge).collect(),
        })
    }

    pub fn aggregates(&self, clock: LocalTime) -> Aggregates {
        Aggregates::compute(&self.network, &self.states, clock)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::service::network::fixtures::{network, station};

    #[test]
    fn counts_passed_and_stopped_stations() {
        let network = network(&[3, 2]);
        let states = vec![
            state(station("l1", 1), Some("2024-03-01T10:00:00Z")),
            state(station("l1", 2), None),
            state(station("l2", 1), None),
        ];

        let aggregates = Aggregates::compute(&network, &states, LocalTime::utc());

        assert_eq!(aggregates.passed, 3);
        assert_eq!(aggregates.stopped, 1);
        assert_eq!(aggregates.total_stations, 5);
        assert_eq!(aggregates.max_passed_on_a_line, 2);
        assert_eq!(aggregates.completed_lines, 0);
    }

    #[test]
    fn a_line_is_complete_once_every_station_is_stopped() {
        let network = network(&[2, 0]);
        let states = vec![
            state(station("l1", 1), Some("2024-03-01T10:00:00Z")),
            state(station("l1", 2), Some("2024-03-01T11:00:00Z")),
        ];

        let aggregates = Aggregates::compute(&network, &states, LocalTime::utc());

        assert_eq!(aggregates.completed_lines, 1, "an empty line never counts");
    }

    #[test]
    fn stops_are_bucketed_by_local_day() {
        let network = network(&[4]);
        let states = vec![
            state(station("l1", 1), Some("2024-03-01T22:30:00Z")),
            state(station("l1", 2), Some("2024-03-01T23:30:00Z")),
            state(station("l1", 3), Some("2024-03-02T09:00:00Z")),
        ];

        let utc = Aggregates::compute(&network, &states, LocalTime::utc());
        let tokyo = Aggregates::compute(
            &network,
            &states,
            LocalTime::from_offset_minutes(9 * 60).unwrap(),
        );

        assert_eq!(utc.max_stopped_in_a_day, 2);
        assert_eq!(tokyo.max_stopped_in_a_day, 3, "all three fall on March 2nd in Tokyo");
    }

    #[test]
    fn night_and_early_visits_follow_the_local_clock() {
        let network = network(&[2]);

        let night = Aggregates::compute(
            &network,
            &[state(station("l1", 1), Some("2024-03-01T02:30:00Z"))],
            LocalTime::utc(),
        );
        assert!(night.night_visit);
        assert!(!night.early_visit);

        let early = Aggregates::compute(
            &network,
            &[state(station("l1", 1), Some("2024-03-01T07:00:00Z"))],
            LocalTime::utc(),
        );
        assert!(early.early_visit);
        assert!(!early.night_visit);
    }

    #[test]
    fn a_stop_that_was_undone_still_counts_for_its_first_date() {
        let network = network(&[1]);
        let mut undone = state(station("l1", 1), Some("2024-03-01T23:00:00Z"));
        undone.stopped = false;

        let aggregates = Aggregates::compute(&network, &[undone], LocalTime::utc());

        assert_eq!(aggregates.stopped, 0);
        assert!(aggregates.night_visit);
        assert_eq!(aggregates.max_stopped_in_a_day, 1);
    }

    #[test]
    fn hour_windows() {
        let night: Vec<u32> = (0..24).filter(|hour| is_night(*hour)).collect();
        let early: Vec<u32> = (0..24).filter(|hour| is_early(*hour)).collect();

        assert_eq!(night, vec![0, 1, 2, 3, 4, 5, 22, 23]);
        assert_eq!(early, vec![6, 7, 8]);
    }
}
