use std::collections::HashMap;

use tracing::instrument;

use super::profile::LineStats;
use crate::prelude::*;

/// One line as a user sees it: stations laid out along the trunk and branches, with their marks.
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub line: Line,
    pub trunk: Vec<Station>,
    /// Branches in the order they first appear along the line.
    pub branches: Vec<(String, Vec<Station>)>,
    pub has_fork: bool,
    /// The user's state of each station of the line they ever marked.
    pub states: HashMap<Record<Station>, StationState>,
    pub stats: LineStats,
}

impl LineView {
    pub fn new(line: Line, mut stations: Vec<Station>, states: Vec<StationState>) -> Self {
        stations.sort_by_key(|station| station.position);

        let states: HashMap<Record<Station>, StationState> = states
            .into_iter()
            .filter(|state| stations.iter().any(|station| station.id == state.station))
            .map(|state| (state.station.clone(), state))
            .collect();

        let stats = LineStats {
            line: line.clone(),
            total: u32::try_from(stations.len()).unwrap_or(u32::MAX),
            passed: count(states.values().filter(|state| state.passed)),
            stopped: count(states.values().filter(|state| state.stopped)),
        };

        let has_fork = stations.iter().any(Station::is_fork);
        let mut trunk = Vec::new();
        let mut branches: Vec<(String, Vec<Station>)> = Vec::new();

        for station in stations {
            let Some(branch) = station.branch_name().map(str::to_string) else {
                trunk.push(station);
                continue;
            };

            match branches.iter_mut().find(|(name, _)| *name == branch) {
                Some((_, members)) => members.push(station),
                None => branches.push((branch, vec![station])),
            }
        }

        Self {
            line,
            trunk,
            branches,
            has_fork,
            states,
            stats,
        }
    }

    /// `None` when the line does not exist.
    #[instrument(level = "debug", skip(db))]
    pub async fn load(
        line: &Record<Line>,
        user: &Record<User>,
        db: &Database,
    ) -> Result<Option<Self>, DatabaseQueryError> {
        let Some(found) = Line::get(line, db).await? else {
            return Ok(None);
        };

        let (stations, states) =
            tokio::try_join!(Station::on_line(line, db), StationState::for_user(user, db))?;

        Ok(Some(Self::new(found, stations, states)))
    }
}

fn count<'a>(states: impl Iterator<Item = &'a StationState>) -> u32 {
    u32::try_from(states.count()).unwrap_or(u32::MAX)
}
