//! Caller-supplied configuration
//!
//! A plain string-keyed lookup with caller-controlled lifetime, passed into
//! nodes and agents explicitly rather than read from a process-wide
//! singleton. `from_env` folds in an optional `.env` file first.

use indexmap::IndexMap;

/// String-keyed configuration values.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: IndexMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment, honoring a `.env` file if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self {
            values: std::env::vars().collect(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for Config {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get() {
        let mut config = Config::new();
        config.set("retries", "3");

        assert_eq!(config.get("retries"), Some("3"));
        assert_eq!(config.get("missing"), None);
        assert_eq!(config.get_or("missing", "fallback"), "fallback");
    }

    #[test]
    fn test_from_iter() {
        let config: Config = [("a".to_string(), "1".to_string())].into_iter().collect();
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("a"), Some("1"));
    }
}
