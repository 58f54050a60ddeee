use std::collections::HashMap;

use crate::prelude::*;

/// The metro network: lines and the stations on them. Reference data, never modified by users.
#[derive(Debug, Clone, Default)]
pub struct Network {
    lines: Vec<Line>,
    stations: Vec<Station>,
    line_of: HashMap<Record<Station>, Record<Line>>,
    station_count: HashMap<Record<Line>, u32>,
}

impl Network {
    pub fn new(lines: Vec<Line>, stations: Vec<Station>) -> Self {
        let mut line_of = HashMap::with_capacity(stations.len());
        let mut station_count: HashMap<Record<Line>, u32> = HashMap::with_capacity(lines.len());

        for station in &stations {
            line_of.insert(station.id.clone(), station.line.clone());
            *station_count.entry(station.line.clone()).or_default() += 1;
        }

        Self {
            lines,
            stations,
            line_of,
            station_count,
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn load(db: &Database) -> Result<Self, DatabaseQueryError> {
        let (lines, stations) = tokio::try_join!(Line::all(db), Station::all(db))?;
        Ok(Self::new(lines, stations))
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn line_of(&self, station: &Record<Station>) -> Option<&Record<Line>> {
        self.line_of.get(station)
    }

    /// Number of stations on `line`; zero for an unknown line.
    pub fn station_count(&self, line: &Record<Line>) -> u32 {
        self.station_count.get(line).copied().unwrap_or_default()
    }

    pub fn total_stations(&self) -> u32 {
        u32::try_from(self.stations.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A network with one line per entry of `sizes`, named `l1`, `l2`, … whose stations are `l1-s1`, `l1-s2`, …
    pub fn network(sizes: &[u32]) -> Network {
        let mut lines = Vec::new();
        let mut stations = Vec::new();

        for (index, size) in sizes.iter().enumerate() {
            let line_key = format!("l{}", index + 1);
            let line_id = Record::<Line>::new(line_key.clone());

            lines.push(Line::new(
                line_id.clone(),
                index as u32,
                (index + 1).to_string(),
                format!("Line {}", index + 1),
                "#FACD00".to_string(),
                None,
            ));

            for position in 1..=*size {
                stations.push(Station::new(
                    station(&line_key, position),
                    line_id.clone(),
                    format!("Station {position} of {line_key}"),
                    position,
                    None,
                ));
            }
        }

        Network::new(lines, stations)
    }

    pub fn station(line_key: &str, position: u32) -> Record<Station> {
        Record::new(format!("{line_key}-s{position}"))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn counts_stations_per_line() {
        let network = network(&[3, 0, 5]);

        assert_eq!(network.total_stations(), 8);
        assert_eq!(network.station_count(&Record::new("l1".to_string())), 3);
        assert_eq!(network.station_count(&Record::new("l2".to_string())), 0);
        assert_eq!(
            network.line_of(&station("l3", 2)),
            Some(&Record::new("l3".to_string()))
        );
    }
}
