use std::collections::BTreeSet;

/// Credentials and address of a database or session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbmsConnectionInfo {
    /// Connection URI, either an HTTP(S) Query API address or a Neo4j URI.
    pub uri: String,
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl DbmsConnectionInfo {
    /// Creates connection info.
    #[must_use]
    pub fn new(uri: &str, username: &str, password: &str) -> Self {
        Self {
            uri: uri.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// The HTTP(S) address of the server's Query API.
    #[must_use]
    pub fn query_api_uri(&self) -> String {
        query_api_uri(&self.uri)
    }
}

/// Maps a Neo4j connection URI to the Query API address of the same server.
///
/// Encrypted schemes map to `https://host`, the others to `http://host:7474`.
/// HTTP(S) URIs are returned unchanged.
#[must_use]
pub fn query_api_uri(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };
    let authority = rest.split('/').next().unwrap_or_default();
    let host = authority.split(':').next().unwrap_or_default();

    match scheme {
        "http" | "https" => uri.to_string(),
        "neo4j+s" | "neo4j+ssc" | "bolt+s" | "bolt+ssc" => format!("https://{host}"),
        _ => format!("http://{host}:7474"),
    }
}

/// Region in `available` closest to `region`.
///
/// An exact match wins; otherwise the region sharing the longest prefix
/// within the same geographic area (the part before the first `-`).
pub(crate) fn closest_region(region: &str, available: &BTreeSet<String>) -> Option<String> {
    if available.contains(region) {
        return Some(region.to_string());
    }

    let area = region.split('-').next().unwrap_or(region);
    available
        .iter()
        .filter(|candidate| candidate.split('-').next() == Some(area))
        .min_by_key(|candidate| std::cmp::Reverse(common_prefix_len(region, candidate)))
        .cloned()
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}
