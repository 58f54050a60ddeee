use crate::prelude::*;
use crate::{define_relation, table};

/// What a user has done at one station.
///
/// `stopped` implies `passed`; the transition rules that keep it so live in [crate::service::toggle].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StationState {
    pub id: Record<StationState>,
    pub user: Record<User>,
    pub station: Record<Station>,

    pub passed: bool,
    pub stopped: bool,

    #[serde(default)]
    pub first_passed_at: Option<Timestamp>,
    #[serde(default)]
    pub first_stopped_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

table!("station_states": StationState = id);

impl StationState {
    /// A state that has not been marked yet, as created on the first toggle of a station.
    pub fn new(user: Record<User>, station: Record<Station>, now: Timestamp) -> Self {
        Self {
            id: Record::uuid(),
            user,
            station,
            passed: false,
            stopped: false,
            first_passed_at: None,
            first_stopped_at: None,
            updated_at: now,
        }
    }

    pub async fn create(&self, db: &Database) -> Result<StationState, DatabaseQueryError> {
        db.sql("CREATE $id CONTENT $content RETURN AFTER")
            .bind(("id", &self.id))
            .bind(("content", self))
            .fetch_one()
            .await
    }

    pub async fn replace(&self, db: &Database) -> Result<StationState, DatabaseQueryError> {
        db.sql("UPDATE $id CONTENT $content RETURN AFTER")
            .bind(("id", &self.id))
            .bind(("content", self))
            .fetch_one()
            .await
    }
}

define_relation! {
    StationState > all() > Vec<StationState>
        where "SELECT * FROM station_states"
}

define_relation! {
    StationState > for_user(user: &Record<User>) > Vec<StationState>
        where "SELECT * FROM station_states WHERE user = $user"
}

define_relation! {
    StationState > find(user: &Record<User>, station: &Record<Station>) > Option<StationState>
        where "SELECT * FROM station_states WHERE user = $user AND station = $station LIMIT 1"
}
