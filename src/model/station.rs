use crate::prelude::*;
use crate::{define_relation, table};

/// Branch label of the station where a forked line splits.
pub const FORK: &str = "fork";

/// Labels used on one-way loops; those stations still belong to the main trunk.
pub const LOOP_DIRECTIONS: [&str; 2] = ["direction", "retour"];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct Station {
    pub id: Record<Station>,
    pub line: Record<Line>,
    pub name: String,
    pub position: u32,
    #[serde(default)]
    pub branch: Option<String>,
}

impl Station {
    /// The branch this station is drawn on, or `None` for the main trunk (which includes the fork itself).
    pub fn branch_name(&self) -> Option<&str> {
        match self.branch.as_deref() {
            None | Some(FORK) => None,
            Some(label) if LOOP_DIRECTIONS.contains(&label) => None,
            Some(label) => Some(label),
        }
    }

    pub fn is_fork(&self) -> bool {
        self.branch.as_deref() == Some(FORK)
    }
}

table!("stations": Station = id);

define_relation! {
    Station > all() > Vec<Station>
        where "SELECT * FROM stations ORDER BY position"
}

define_relation! {
    Station > get(id: &Record<Station>) > Option<Station>
        where "SELECT * FROM stations WHERE id = $id LIMIT 1"
}

define_relation! {
    Station > on_line(line: &Record<Line>) > Vec<Station>
        where "SELECT * FROM stations WHERE line = $line ORDER BY position"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(branch: Option<&str>) -> Station {
        Station::new(
            Record::new("s".to_string()),
            Record::new("l13".to_string()),
            "La Fourche".to_string(),
            1,
            branch.map(str::to_string),
        )
    }

    #[test]
    fn forks_and_loops_stay_on_the_trunk() {
        assert_eq!(station(None).branch_name(), None);
        assert_eq!(station(Some("fork")).branch_name(), None);
        assert_eq!(station(Some("retour")).branch_name(), None);
        assert_eq!(station(Some("asnieres")).branch_name(), Some("asnieres"));
        assert!(station(Some("fork")).is_fork());
    }
}
