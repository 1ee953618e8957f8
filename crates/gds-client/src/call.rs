//! Procedure call rendering and bound parameters.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Procedure configuration map, passed as the trailing `$config` parameter.
pub type Config = Map<String, Value>;

/// Bound parameters of a procedure call, in argument order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CallParameters(IndexMap<String, Value>);

impl CallParameters {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter (builder pattern).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Appends or replaces a parameter. Replacing keeps the original position.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Returns a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns a mutable parameter value.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    /// Parameter names in argument order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters as a JSON object, as sent over the wire.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Renders `CALL <endpoint>($a, $b, ...)` with an optional `YIELD` clause.
    #[must_use]
    pub fn procedure_query(&self, endpoint: &str, yields: &[&str]) -> String {
        let args = self
            .names()
            .map(|name| format!("${name}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut query = format!("CALL {endpoint}({args})");
        if !yields.is_empty() {
            query.push_str(" YIELD ");
            query.push_str(&yields.join(", "));
        }
        query
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for CallParameters {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Accepts a procedure configuration given as JSON.
///
/// Objects are taken as is and `null` is an empty configuration. Anything
/// else is rejected.
pub fn config_map(config: Value) -> Result<Config> {
    match config {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Config::new()),
        other => Err(Error::InvalidArgument(format!(
            "procedure configuration must be a JSON object, got {other}"
        ))),
    }
}

/// A single entity filter or a list of them, e.g. node labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strings {
    /// A single name.
    One(String),
    /// Several names.
    Many(Vec<String>),
}

impl Strings {
    /// The `["*"]` filter matching every label or type.
    #[must_use]
    pub fn all() -> Self {
        Self::Many(vec!["*".to_string()])
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::all()
    }
}

impl From<&str> for Strings {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for Strings {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for Strings {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

impl From<Vec<&str>> for Strings {
    fn from(v: Vec<&str>) -> Self {
        Self::Many(v.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Strings {
    fn from(v: [&str; N]) -> Self {
        Self::Many(v.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<Strings> for Value {
    fn from(s: Strings) -> Self {
        match s {
            Strings::One(one) => Value::String(one),
            Strings::Many(many) => Value::from(many),
        }
    }
}
