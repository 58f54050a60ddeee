use std::sync::Arc;

use dashmap::DashMap;
use snafu::ensure;
use tokio::sync::Mutex;
use tracing::instrument;

use super::evaluator::BadgeEvaluator;
use super::toggle::{self, Marks, ToggleRequest};
use crate::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TrackerError {
    #[snafu(display("failed to load station `{station}`"))]
    LoadStation {
        station: Record<Station>,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("station `{station}` does not exist on line `{line}`"))]
    StationNotFound {
        line: Record<Line>,
        station: Record<Station>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to load the state of station `{station}`"))]
    LoadState {
        station: Record<Station>,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("station `{station}` was last updated at {actual:?}, not at {expected}"))]
    StaleToggle {
        station: Record<Station>,
        expected: Timestamp,
        actual: Option<Timestamp>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to save the state of station `{station}`"))]
    SaveState {
        station: Record<Station>,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for TrackerError {
    fn location(&self) -> Location {
        match self {
            TrackerError::LoadStation { location, .. }
            | TrackerError::StationNotFound { location, .. }
            | TrackerError::LoadState { location, .. }
            | TrackerError::StaleToggle { location, .. }
            | TrackerError::SaveState { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub state: StationState,
    /// Badges earned because of this toggle, in catalog order.
    pub new_badges: Vec<Badge>,
}

/// Records what users did at each station and awards the badges that follow.
///
/// Toggles of the same user run one at a time, from loading the station state to the end of the badge evaluation.
#[derive(Debug, Clone, new)]
pub struct StationTracker {
    database: Database,
    evaluator: BadgeEvaluator,
    #[new(default)]
    locks: Arc<DashMap<Record<User>, Arc<Mutex<()>>>>,
}

impl StationTracker {
    #[instrument(skip(self), fields(%user, %line, %station))]
    pub async fn toggle(
        &self,
        user: &Record<User>,
        line: &Record<Line>,
        station: &Record<Station>,
        request: ToggleRequest,
    ) -> Result<ToggleOutcome, TrackerError> {
        let lock = self.lock_for(user);

        let outcome = {
            let _guard = lock.lock().await;
            self.toggle_exclusive(user, line, station, &request).await
        };

        drop(lock);
        self.release(user);

        outcome
    }

    async fn toggle_exclusive(
        &self,
        user: &Record<User>,
        line: &Record<Line>,
        station: &Record<Station>,
        request: &ToggleRequest,
    ) -> Result<ToggleOutcome, TrackerError> {
        Station::get(station, &self.database)
            .await
            .context(LoadStationSnafu { station: station.clone() })?
            .filter(|found| &found.line == line)
            .context(StationNotFoundSnafu {
                line: line.clone(),
                station: station.clone(),
            })?;

        let existing = StationState::find(user, station, &self.database)
            .await
            .context(LoadStateSnafu { station: station.clone() })?;

        if let Some(expected) = request.expected_updated_at() {
            let actual = existing.as_ref().map(|state| state.updated_at);
            ensure!(
                actual == Some(expected),
                StaleToggleSnafu {
                    station: station.clone(),
                    expected,
                    actual,
                }
            );
        }

        let now = now();
        let state = match existing {
            Some(mut state) => {
                let previous = Marks::of(&state);
                toggle::apply(&mut state, request.desired(previous), now);
                tracing::info!(?previous, current = ?Marks::of(&state), "station toggled");
                state.replace(&self.database).await
            }
            None => {
                let mut state = StationState::new(user.clone(), station.clone(), now);
                toggle::apply(&mut state, request.desired(Marks::default()), now);
                tracing::info!(current = ?Marks::of(&state), "station toggled for the first time");
                state.create(&self.database).await
            }
        }
        .context(SaveStateSnafu { station: station.clone() })?;

        // The station state is already stored; losing the badges of this toggle is better than failing it.
        let new_badges = match self.evaluator.evaluate(user).await {
            Ok(badges) => badges,
            Err(error) => {
                tracing::error!(%error, location = %error.location(), "badge evaluation failed after a toggle");
                Vec::new()
            }
        };

        Ok(ToggleOutcome { state, new_badges })
    }

    fn lock_for(&self, user: &Record<User>) -> Arc<Mutex<()>> {
        self.locks.entry(user.clone()).or_default().clone()
    }

    fn release(&self, user: &Record<User>) {
        self.locks
            .remove_if(user, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::evaluator::fixtures::{badge, n};
    use crate::service::network::fixtures::{network, station};
    use crate::service::toggle::MarkKind;

    async fn setup() -> (StationTracker, Record<User>) {
        let db = Database::in_memory().await;
        let network = network(&[2, 1]);

        for line in network.lines() {
            db.put(line).await.unwrap();
        }
        for station in network.stations() {
            db.put(station).await.unwrap();
        }
        for badge in [
            badge("first_pass", 0, Criterion::Passed(n(1))),
            badge("first_stop", 1, Criterion::Stopped(n(1))),
            badge("line_master", 2, Criterion::LineComplete(n(1))),
        ] {
            db.put(&badge).await.unwrap();
        }

        let user = User::new("alice".to_string()).create(&db).await.unwrap();
        let evaluator = BadgeEvaluator::new(db.clone(), LocalTime::utc());

        (StationTracker::new(db, evaluator), user.id)
    }

    fn line(key: &str) -> Record<Line> {
        Record::new(key.to_string())
    }

    fn end_state(passed: bool, stopped: bool) -> ToggleRequest {
        ToggleRequest::EndState {
            passed,
            stopped,
            expected_updated_at: None,
        }
    }

    fn names(outcome: &ToggleOutcome) -> Vec<String> {
        outcome.new_badges.iter().map(|badge| badge.id.key()).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_stop_creates_the_state_and_awards_badges() {
        let (tracker, user) = setup().await;

        let outcome = tracker
            .toggle(&user, &line("l1"), &station("l1", 1), end_state(false, true))
            .await
            .unwrap();

        assert!(outcome.state.passed && outcome.state.stopped);
        assert_eq!(outcome.state.first_passed_at, outcome.state.first_stopped_at);
        assert_eq!(names(&outcome), vec!["first_pass", "first_stop"]);

        let again = tracker
            .toggle(&user, &line("l1"), &station("l1", 1), end_state(true, true))
            .await
            .unwrap();
        assert!(again.new_badges.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unpassing_keeps_the_first_dates_and_the_badges() {
        let (tracker, user) = setup().await;
        let stop = station("l2", 1);

        let stopped = tracker
            .toggle(&user, &line("l2"), &stop, end_state(true, true))
            .await
            .unwrap();
        assert_eq!(names(&stopped), vec!["first_pass", "first_stop", "line_master"]);

        let cleared = tracker
            .toggle(
                &user,
                &line("l2"),
                &stop,
                ToggleRequest::Delta {
                    kind: MarkKind::Passed,
                    checked: false,
                },
            )
            .await
            .unwrap();

        assert!(!cleared.state.passed && !cleared.state.stopped);
        assert_eq!(cleared.state.first_stopped_at, stopped.state.first_stopped_at);
        assert_eq!(cleared.state.first_passed_at, stopped.state.first_passed_at);
        assert!(cleared.new_badges.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stations_of_another_line_are_not_found() {
        let (tracker, user) = setup().await;

        let error = tracker
            .toggle(&user, &line("l2"), &station("l1", 1), end_state(true, false))
            .await
            .unwrap_err();

        assert!(matches!(error, TrackerError::StationNotFound { .. }), "{error}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stale_expectations_are_rejected() {
        let (tracker, user) = setup().await;
        let target = station("l1", 2);

        let first = tracker
            .toggle(&user, &line("l1"), &target, end_state(true, false))
            .await
            .unwrap();

        let current = ToggleRequest::EndState {
            passed: true,
            stopped: true,
            expected_updated_at: Some(first.state.updated_at),
        };
        let second = tracker
            .toggle(&user, &line("l1"), &target, current.clone())
            .await
            .unwrap();
        assert!(second.state.stopped);

        let error = tracker
            .toggle(&user, &line("l1"), &target, current)
            .await
            .unwrap_err();
        assert!(matches!(error, TrackerError::StaleToggle { .. }), "{error}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_toggles_of_one_user_are_serialized() {
        let (tracker, user) = setup().await;

        let toggles = (1..=2).map(|position| {
            let tracker = tracker.clone();
            let user = user.clone();
            tokio::spawn(async move {
                tracker
                    .toggle(&user, &line("l1"), &station("l1", position), end_state(true, true))
                    .await
            })
        });

        let mut awarded = Vec::new();
        for handle in toggles.collect::<Vec<_>>() {
            awarded.extend(names(&handle.await.unwrap().unwrap()));
        }
        awarded.sort();

        assert_eq!(
            awarded,
            vec!["first_pass", "first_stop", "line_master"],
            "each badge is awarded exactly once"
        );
        assert!(tracker.locks.is_empty(), "locks are released once unused");
    }
}
