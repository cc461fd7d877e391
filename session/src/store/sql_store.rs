//! SqlSessionStore
//! ---------------
//! SQL-backed implementation of [`SessionHandler`]. One row per session id
//! holds the opaque payload and the unix second it was last written.
//!
//!  - every operation is a single parameterized statement
//!  - expiry is `modified_timestamp < now - max_age`, computed in Rust so
//!    the `open` sweep and `gc` cannot disagree
//!  - the injected handle is kept for the lifetime of the store; `close`
//!    only drops the active copy, and `open` restores it
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::logger::warn_if_slow;
use parking_lot::Mutex;
use sqlx::{AnyPool, Row};
use tracing::{debug, info, instrument, warn};

use super::SessionHandler;
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::db::queries::Queries;
use crate::db::{Db, schema};
use crate::error::StoreError;
use crate::model::{expiry_cutoff, validate_session_id};

const SLOW_STATEMENT: Duration = Duration::from_millis(100);

pub struct SqlSessionStore {
    /// Handle injected at construction. Never cleared.
    db: Db,
    /// Handle used by operations; `None` between `close` and `open`.
    active: Mutex<Option<AnyPool>>,
    table: String,
    max_age_secs: u64,
    queries: Queries,
    clock: Arc<dyn Clock>,
}

impl SqlSessionStore {
    /// Build a store on the wall clock and make sure `table` exists.
    pub async fn new(
        db: Db,
        table: impl Into<String>,
        max_age_secs: u64,
    ) -> Result<Self, StoreError> {
        Self::with_clock(db, table, max_age_secs, Arc::new(SystemClock)).await
    }

    pub async fn with_clock(
        db: Db,
        table: impl Into<String>,
        max_age_secs: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let table = table.into();
        schema::ensure_table(&db, &table).await?;

        let queries = Queries::render(&table, db.dialect);
        info!(table = %table, max_age_secs, dialect = ?db.dialect, "session store ready");

        Ok(Self {
            active: Mutex::new(Some(db.pool.clone())),
            db,
            table,
            max_age_secs,
            queries,
            clock,
        })
    }

    /// Connect using `cfg` and build the store.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self, StoreError> {
        let db = Db::connect(&cfg.database_url).await?;
        Self::new(db, cfg.table_name.clone(), cfg.max_age_secs).await
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    /// False between `close` and the next `open`.
    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    fn active_pool(&self) -> Result<AnyPool, StoreError> {
        self.active.lock().clone().ok_or(StoreError::Closed)
    }

    async fn sweep(&self, max_age_secs: u64) -> Result<u64, StoreError> {
        let pool = self.active_pool()?;
        let cutoff = expiry_cutoff(self.clock.now_secs(), max_age_secs);

        let res = warn_if_slow(
            "db_sweep",
            SLOW_STATEMENT,
            sqlx::query(&self.queries.sweep).bind(cutoff).execute(&pool),
        )
        .await?;

        debug!(cutoff, removed = res.rows_affected(), "expired sessions swept");
        Ok(res.rows_affected())
    }

    async fn try_read(&self, id: &str) -> Result<String, StoreError> {
        validate_session_id(id)?;
        let pool = self.active_pool()?;

        let row = warn_if_slow(
            "db_read",
            SLOW_STATEMENT,
            sqlx::query(&self.queries.read).bind(id).fetch_optional(&pool),
        )
        .await?;

        match row {
            Some(r) => Ok(r.try_get::<Option<String>, _>("data")?.unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    async fn try_write(&self, id: &str, data: &str) -> Result<(), StoreError> {
        validate_session_id(id)?;
        let pool = self.active_pool()?;
        let now = self.clock.now_secs();

        warn_if_slow(
            "db_write",
            SLOW_STATEMENT,
            sqlx::query(&self.queries.write)
                .bind(id)
                .bind(now)
                .bind(data)
                .execute(&pool),
        )
        .await?;

        Ok(())
    }

    async fn try_destroy(&self, id: &str) -> Result<u64, StoreError> {
        validate_session_id(id)?;
        let pool = self.active_pool()?;

        let res = warn_if_slow(
            "db_destroy",
            SLOW_STATEMENT,
            sqlx::query(&self.queries.destroy).bind(id).execute(&pool),
        )
        .await?;

        Ok(res.rows_affected())
    }
}

#[async_trait]
impl SessionHandler for SqlSessionStore {
    /// Rebind the original handle and sweep expired rows.
    ///
    /// Called at the start of every session episode. The sweep uses the
    /// store's configured max age and succeeds even when nothing matches.
    /// Reopening after `close` always works; the store never has to be
    /// rebuilt.
    #[instrument(skip(self), target = "store")]
    async fn open(&self, save_path: &str, session_name: &str) -> bool {
        *self.active.lock() = Some(self.db.pool.clone());

        match self.sweep(self.max_age_secs).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, table = %self.table, "open sweep failed");
                false
            }
        }
    }

    /// Drop the active handle.
    ///
    /// The host expects a strict `true` here, so this never reports failure.
    /// The injected handle is kept for the next `open`.
    async fn close(&self) -> bool {
        self.active.lock().take();
        debug!(table = %self.table, "session store closed");
        true
    }

    /// Load the payload for `id`, verbatim.
    ///
    /// Returns `""` for an unknown id, an invalid id, a closed store, or a
    /// failed query. The host aborts the session on anything else, so this
    /// never signals absence any other way.
    #[instrument(skip(self), target = "store")]
    async fn read(&self, id: &str) -> String {
        self.try_read(id).await.unwrap_or_else(|e| {
            warn!(error = %e, "read failed; returning empty session");
            String::new()
        })
    }

    /// Store or replace the payload for `id`.
    ///
    /// One upsert statement:
    /// - new id → inserted, stamped with now
    /// - existing id → payload replaced, stamp moved forward to now
    #[instrument(skip(self, data), target = "store", fields(len = data.len()))]
    async fn write(&self, id: &str, data: &str) -> bool {
        match self.try_write(id, data).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "write failed");
                false
            }
        }
    }

    /// Permanently delete `id`.
    ///
    /// Zero rows affected is still success, so destroying an unknown id
    /// returns `true`.
    #[instrument(skip(self), target = "store")]
    async fn destroy(&self, id: &str) -> bool {
        match self.try_destroy(id).await {
            Ok(removed) => {
                debug!(removed, "session destroyed");
                true
            }
            Err(e) => {
                warn!(error = %e, "destroy failed");
                false
            }
        }
    }

    /// Delete every row older than `max_lifetime_secs`.
    ///
    /// The lifetime comes from the caller and may differ from the store
    /// default. The cutoff is computed by the same function the `open`
    /// sweep uses.
    #[instrument(skip(self), target = "store")]
    async fn gc(&self, max_lifetime_secs: u64) -> bool {
        match self.sweep(max_lifetime_secs).await {
            Ok(removed) => {
                info!(removed, "session gc complete");
                true
            }
            Err(e) => {
                warn!(error = %e, table = %self.table, "session gc failed");
                false
            }
        }
    }
}
