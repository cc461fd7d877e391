use clap::{Parser, Subcommand};

use session::StoreConfig;

#[derive(Debug, Parser)]
#[clap(name = "sessionctl", version, about = "Inspect and maintain the session table")]
pub struct Cli {
    /// Database connection string (sqlite://, postgres:// or mysql://).
    /// Overrides DATABASE_URL.
    #[clap(long, global = true)]
    pub database_url: Option<String>,

    /// Session table name. Overrides SESSION_TABLE.
    #[clap(long, global = true)]
    pub table: Option<String>,

    /// Default session lifetime in seconds. Overrides SESSION_MAX_AGE_SECS.
    #[clap(long, global = true)]
    pub max_age: Option<u64>,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    pub json_logs: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Create the session table and index if missing
    Init,
    /// Run the open-time sweep using the default lifetime
    Open,
    /// Print the stored payload for a session
    Read { id: String },
    /// Store a payload for a session
    Write { id: String, data: String },
    /// Delete a session
    Destroy { id: String },
    /// Delete every session older than the given lifetime
    Gc {
        /// Lifetime in seconds; defaults to the configured max age
        #[clap(long)]
        max_lifetime: Option<u64>,
    },
}

impl Cli {
    /// Flags layered over the environment.
    pub fn store_config(&self) -> StoreConfig {
        self.apply_overrides(StoreConfig::from_env())
    }

    fn apply_overrides(&self, mut cfg: StoreConfig) -> StoreConfig {
        if let Some(url) = &self.database_url {
            cfg = cfg.with_database_url(url.clone());
        }
        if let Some(table) = &self.table {
            cfg = cfg.with_table_name(table.clone());
        }
        if let Some(secs) = self.max_age {
            cfg = cfg.with_max_age_secs(secs);
        }
        cfg
    }
}
