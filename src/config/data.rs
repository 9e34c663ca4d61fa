use super::params;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Default location of the test data file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "config/test_data.json";

/// Named inputs shared by every test in a session: the API key, search
/// queries and credentials.
///
/// Values may reference environment variables as `${NAME}`; they are
/// expanded once at load time. A value whose variable is unset does not
/// fail the load; reading that key does.
#[derive(Debug, Clone, Default)]
pub struct TestData {
    values: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
enum Value {
    Resolved(String),
    /// Expansion failed; holds the reason.
    Unresolved(String),
}

impl TestData {
    /// Load test data from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse test data from a flat JSON object of strings.
    pub fn parse(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let mut values = BTreeMap::new();
        for (key, template) in raw {
            let value = match params::expand_env(&template) {
                Ok(value) => Value::Resolved(value),
                Err(Error::Config(reason)) => {
                    debug!("test data '{}' left unresolved: {}", key, reason);
                    Value::Unresolved(reason)
                }
                Err(e) => return Err(e),
            };
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    /// Look up a value; a missing key or an unset variable is a config error.
    pub fn get(&self, key: &str) -> Result<&str> {
        match self.values.get(key) {
            Some(value) => value.resolved(key),
            None => Err(Error::Config(format!("test data has no key '{}'", key))),
        }
    }

    /// Look up a value, falling back to the key itself when it is absent.
    ///
    /// Negative cases mix named fixtures with literal inputs (an empty
    /// login, a deliberately wrong email) in one parameter table. A present
    /// key with an unset variable is still an error.
    pub fn get_or_literal<'a>(&'a self, key: &'a str) -> Result<&'a str> {
        match self.values.get(key) {
            Some(value) => value.resolved(key),
            None => Ok(key),
        }
    }

    /// The catalog API key.
    pub fn api_key(&self) -> Result<&str> {
        self.get("api_key")
    }

    /// Whether `key` is present, resolved or not.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Keys whose placeholders could not be expanded, with the reason.
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().filter_map(|(key, value)| match value {
            Value::Unresolved(reason) => Some((key.as_str(), reason.as_str())),
            Value::Resolved(_) => None,
        })
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Value {
    fn resolved(&self, key: &str) -> Result<&str> {
        match self {
            Value::Resolved(value) => Ok(value.as_str()),
            Value::Unresolved(reason) => {
                Err(Error::Config(format!("test data '{}': {}", key, reason)))
            }
        }
    }
}
