use crate::prelude::*;
use crate::{define_relation, table};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct Badge {
    pub id: Record<Badge>,
    /// Catalog order; badges are evaluated and listed in this order.
    pub position: u32,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// Display category such as `starter` or `special`.
    #[serde(rename = "type")]
    pub kind: String,
    pub criteria: Criterion,
}

table!("badges": Badge = id);

define_relation! {
    Badge > catalog() > Vec<Badge>
        where "SELECT * FROM badges ORDER BY position"
}

define_relation! {
    Badge > get(id: &Record<Badge>) > Option<Badge>
        where "SELECT * FROM badges WHERE id = $id LIMIT 1"
}
