//! Loading reference data: the badge catalog and the metro network.

use std::path::{Path, PathBuf};

use tracing::instrument;

use super::network::Network;
use crate::model::RawCriteria;
use crate::prelude::*;

/// The catalog shipped with the application.
pub const DEFAULT_BADGES: &str = include_str!("../../assets/badges.json");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CatalogError {
    #[snafu(display("cannot read `{}`", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("malformed {what}: {source}"))]
    Parse {
        what: &'static str,
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to store {what}"))]
    Store {
        what: String,
        source: DatabaseQueryError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for CatalogError {
    fn location(&self) -> Location {
        match self {
            CatalogError::Read { location, .. }
            | CatalogError::Parse { location, .. }
            | CatalogError::Store { location, .. } => *location,
        }
    }
}

/// A badge as written in a catalog file. Its criteria are only checked once the whole file parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub criteria: RawCriteria,
}

pub fn parse_badges(json: &str) -> Result<Vec<Badge>, CatalogError> {
    let entries: Vec<BadgeEntry> =
        serde_json::from_str(json).context(ParseSnafu { what: "badge catalog" })?;

    Ok(badges(entries))
}

/// Turn catalog entries into badges, skipping the ones whose criteria make no sense.
///
/// A badge keeps the position of its entry even when earlier entries were skipped.
pub fn badges(entries: Vec<BadgeEntry>) -> Vec<Badge> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let criteria = match Criterion::try_from(entry.criteria) {
                Ok(criteria) => criteria,
                Err(error) => {
                    tracing::warn!(badge = %entry.name, %error, "skipping a badge with malformed criteria");
                    return None;
                }
            };

            let key = entry.id.unwrap_or_else(|| format!("badge-{:02}", index + 1));
            let position = u32::try_from(index).unwrap_or(u32::MAX);

            Some(Badge::new(
                Record::new(key),
                position,
                entry.name,
                entry.description,
                entry.icon,
                entry.kind,
                criteria,
            ))
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkFile {
    pub lines: Vec<LineEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEntry {
    pub id: String,
    pub number: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub stations: Vec<StationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub branch: Option<String>,
}

impl From<NetworkFile> for Network {
    fn from(file: NetworkFile) -> Self {
        let mut lines = Vec::with_capacity(file.lines.len());
        let mut stations = Vec::new();

        for (line_position, entry) in file.lines.into_iter().enumerate() {
            let line = Record::<Line>::new(entry.id);

            for (position, station) in entry.stations.into_iter().enumerate() {
                stations.push(Station::new(
                    Record::new(station.id),
                    line.clone(),
                    station.name,
                    u32::try_from(position + 1).unwrap_or(u32::MAX),
                    station.branch,
                ));
            }

            lines.push(Line::new(
                line,
                u32::try_from(line_position).unwrap_or(u32::MAX),
                entry.number,
                entry.name,
                entry.color,
                entry.text_color,
            ));
        }

        Network::new(lines, stations)
    }
}

pub fn parse_network(json: &str) -> Result<Network, CatalogError> {
    let file: NetworkFile =
        serde_json::from_str(json).context(ParseSnafu { what: "network file" })?;

    Ok(file.into())
}

pub async fn read(path: &Path) -> Result<String, CatalogError> {
    tokio::fs::read_to_string(path)
        .await
        .context(ReadSnafu { path })
}

/// Store the catalog and, when given, the network. Existing rows with the same ids are replaced.
#[instrument(skip_all, fields(badges = badges.len()))]
pub async fn seed(
    badges: &[Badge],
    network: Option<&Network>,
    db: &Database,
) -> Result<(), CatalogError> {
    if let Some(network) = network {
        for line in network.lines() {
            db.put(line).await.context(StoreSnafu {
                what: format!("line `{}`", line.id),
            })?;
        }

        for station in network.stations() {
            db.put(station).await.context(StoreSnafu {
                what: format!("station `{}`", station.id),
            })?;
        }

        tracing::info!(
            lines = network.lines().len(),
            stations = network.stations().len(),
            "seeded the network"
        );
    }

    for badge in badges {
        db.put(badge).await.context(StoreSnafu {
            what: format!("badge `{}`", badge.id),
        })?;
    }

    tracing::info!("seeded the badge catalog");
    Ok(())
}
