use std::ops::Deref;

use super::GdsSessions;
use crate::error::Result;
use crate::graph_data_science::GraphDataScience;

/// Client connected to a GDS session and the database it serves.
///
/// Dereferences to [`GraphDataScience`]; procedures run on the session and
/// Cypher runs on the database.
#[derive(Debug, Clone)]
pub struct AuraGraphDataScience {
    gds: GraphDataScience,
    session_name: String,
    sessions: GdsSessions,
}

impl AuraGraphDataScience {
    pub(crate) fn new(gds: GraphDataScience, session_name: &str, sessions: GdsSessions) -> Self {
        Self {
            gds,
            session_name: session_name.to_string(),
            sessions,
        }
    }

    /// Name of the session.
    #[must_use]
    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Closes the connections and deletes the session.
    pub async fn delete(self) -> Result<bool> {
        self.gds.close().await?;
        self.sessions.delete(&self.session_name).await
    }
}

impl Deref for AuraGraphDataScience {
    type Target = GraphDataScience;

    fn deref(&self) -> &GraphDataScience {
        &self.gds
    }
}
