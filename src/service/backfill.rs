use tracing::instrument;

use crate::prelude::*;

/// Give a first-achievement date to marks that were set before those dates were recorded.
///
/// The last update is the best guess available. Returns whether anything changed.
pub fn backfill(state: &mut StationState) -> bool {
    let mut changed = false;

    if state.passed && state.first_passed_at.is_none() {
        state.first_passed_at = Some(state.updated_at);
        changed = true;
    }

    if state.stopped && state.first_stopped_at.is_none() {
        state.first_stopped_at = Some(state.updated_at);
        changed = true;
    }

    changed
}

/// Run [backfill] over every station state, returning how many were updated.
#[instrument(skip_all)]
pub async fn backfill_first_dates(db: &Database) -> Result<usize, DatabaseQueryError> {
    let states = StationState::all(db).await?;
    let total = states.len();
    let mut updated = 0;

    for mut state in states {
        if backfill(&mut state) {
            state.replace(db).await?;
            updated += 1;
        }
    }

    tracing::info!(total, updated, "backfilled first visit dates");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::at;

    fn legacy(passed: bool, stopped: bool) -> StationState {
        let mut state = StationState::new(
            Record::new("alice".to_string()),
            Record::new("l1-s1".to_string()),
            at("2023-06-01T18:00:00Z"),
        );
        state.passed = passed;
        state.stopped = stopped;
        state
    }

    #[test]
    fn stamps_missing_dates_with_the_last_update() {
        let mut state = legacy(true, true);

        assert!(backfill(&mut state));
        assert_eq!(state.first_passed_at, Some(at("2023-06-01T18:00:00Z")));
        assert_eq!(state.first_stopped_at, Some(at("2023-06-01T18:00:00Z")));

        assert!(!backfill(&mut state), "a second run has nothing to do");
    }

    #[test]
    fn existing_dates_and_unset_marks_are_left_alone() {
        let mut untouched = legacy(false, false);
        assert!(!backfill(&mut untouched));
        assert_eq!(untouched.first_passed_at, None);

        let mut dated = legacy(true, false);
        dated.first_passed_at = Some(at("2023-01-01T00:00:00Z"));
        assert!(!backfill(&mut dated));
        assert_eq!(dated.first_passed_at, Some(at("2023-01-01T00:00:00Z")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn updates_only_the_rows_that_need_it() {
        let db = Database::in_memory().await;

        let mut untouched = legacy(false, false);
        untouched.station = Record::new("l1-s2".to_string());

        legacy(true, true).create(&db).await.unwrap();
        untouched.create(&db).await.unwrap();

        assert_eq!(backfill_first_dates(&db).await.unwrap(), 1);
        assert_eq!(backfill_first_dates(&db).await.unwrap(), 0);
    }
}
