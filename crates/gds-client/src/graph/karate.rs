//! Zachary's karate club network.

use serde_json::{json, Value};

use crate::error::Result;
use crate::frame::DataFrame;

/// Friendships between the 34 club members, one-based member ids.
#[rustfmt::skip]
pub const KARATE_CLUB_EDGES: [(u32, u32); 78] = [
    (1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7), (1, 8), (1, 9),
    (1, 11), (1, 12), (1, 13), (1, 14), (1, 18), (1, 20), (1, 22), (1, 32),
    (2, 3), (2, 4), (2, 8), (2, 14), (2, 18), (2, 20), (2, 22), (2, 31),
    (3, 4), (3, 8), (3, 9), (3, 10), (3, 14), (3, 28), (3, 29), (3, 33),
    (4, 8), (4, 13), (4, 14),
    (5, 7), (5, 11),
    (6, 7), (6, 11), (6, 17),
    (7, 17),
    (9, 31), (9, 33), (9, 34),
    (10, 34),
    (14, 34),
    (15, 33), (15, 34),
    (16, 33), (16, 34),
    (19, 33), (19, 34),
    (20, 34),
    (21, 33), (21, 34),
    (23, 33), (23, 34),
    (24, 26), (24, 28), (24, 30), (24, 33), (24, 34),
    (25, 26), (25, 28), (25, 32),
    (26, 32),
    (27, 30), (27, 34),
    (28, 34),
    (29, 32), (29, 34),
    (30, 33), (30, 34),
    (31, 33), (31, 34),
    (32, 33), (32, 34),
    (33, 34),
];

const MEMBERS: u32 = 34;

/// The club members as `Person` nodes.
pub fn karate_club_nodes() -> Result<DataFrame> {
    DataFrame::from_columns(vec![
        ("nodeId", (1..=MEMBERS).map(Value::from).collect()),
        ("labels", vec![json!("Person"); MEMBERS as usize]),
    ])
}

/// The friendships as `KNOWS` relationships.
pub fn karate_club_relationships() -> Result<DataFrame> {
    DataFrame::from_columns(vec![
        (
            "sourceNodeId",
            KARATE_CLUB_EDGES.iter().map(|(s, _)| Value::from(*s)).collect(),
        ),
        (
            "targetNodeId",
            KARATE_CLUB_EDGES.iter().map(|(_, t)| Value::from(*t)).collect(),
        ),
        (
            "relationshipType",
            vec![json!("KNOWS"); KARATE_CLUB_EDGES.len()],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_karate_club_shape() {
        let nodes = karate_club_nodes().unwrap();
        let rels = karate_club_relationships().unwrap();

        assert_eq!(nodes.len(), 34);
        assert_eq!(rels.len(), 78);
        assert!(KARATE_CLUB_EDGES
            .iter()
            .all(|&(s, t)| s < t && (1..=34).contains(&t)));
    }

    #[test]
    fn test_karate_club_has_no_duplicate_edges() {
        let mut edges = KARATE_CLUB_EDGES.to_vec();
        edges.sort_unstable();
        edges.dedup();
        assert_eq!(edges.len(), 78);
    }
}
