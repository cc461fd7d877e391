use tracing::warn;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://sessions_dev.db?mode=rwc";
pub const DEFAULT_TABLE_NAME: &str = "sessions";
pub const DEFAULT_MAX_AGE_SECS: u64 = 86_400;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Database connection string. The scheme selects the SQL dialect.
    pub database_url: String,

    /// Table holding session rows. Interpolated into SQL, so it must pass
    /// `db::schema::validate_table_name`.
    pub table_name: String,

    /// Default session lifetime in seconds.
    ///
    /// Used by the sweep that runs on every `open`. `gc` takes its own
    /// lifetime from the caller and does not consult this value.
    pub max_age_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }
}

impl StoreConfig {
    /// Reads `DATABASE_URL`, `SESSION_TABLE` and `SESSION_MAX_AGE_SECS`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_age_secs = match lookup("SESSION_MAX_AGE_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(
                    value = %raw,
                    fallback = DEFAULT_MAX_AGE_SECS,
                    "unparsable SESSION_MAX_AGE_SECS; using default"
                );
                DEFAULT_MAX_AGE_SECS
            }),
            None => defaults.max_age_secs,
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            table_name: lookup("SESSION_TABLE").unwrap_or(defaults.table_name),
            max_age_secs,
        }
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = table.into();
        self
    }

    pub fn with_max_age_secs(mut self, secs: u64) -> Self {
        self.max_age_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = StoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(cfg, StoreConfig::default());
        assert_eq!(cfg.max_age_secs, 86_400);
        assert_eq!(cfg.table_name, "sessions");
    }

    #[test]
    fn reads_all_keys() {
        let cfg = StoreConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("SESSION_TABLE", "php_sessions"),
            ("SESSION_MAX_AGE_SECS", " 1440 "),
        ]));

        assert_eq!(cfg.database_url, "postgres://localhost/app");
        assert_eq!(cfg.table_name, "php_sessions");
        assert_eq!(cfg.max_age_secs, 1_440);
    }

    #[test]
    fn bad_max_age_falls_back() {
        let cfg = StoreConfig::from_lookup(lookup_from(&[("SESSION_MAX_AGE_SECS", "a day")]));
        assert_eq!(cfg.max_age_secs, DEFAULT_MAX_AGE_SECS);
    }

    #[test]
    fn builders_override() {
        let cfg = StoreConfig::default()
            .with_database_url("sqlite::memory:")
            .with_table_name("t")
            .with_max_age_secs(60);

        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.table_name, "t");
        assert_eq!(cfg.max_age_secs, 60);
    }
}
