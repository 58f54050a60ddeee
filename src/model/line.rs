use crate::prelude::*;
use crate::{define_relation, table};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct Line {
    pub id: Record<Line>,
    /// Display order on the network map.
    pub position: u32,
    /// The public line number, e.g. `7bis`.
    pub number: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub text_color: Option<String>,
}

table!("lines": Line = id);

define_relation! {
    Line > all() > Vec<Line>
        where "SELECT * FROM lines ORDER BY position"
}

define_relation! {
    Line > get(id: &Record<Line>) > Option<Line>
        where "SELECT * FROM lines WHERE id = $id LIMIT 1"
}
