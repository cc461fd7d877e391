use tracing::{debug, instrument};

use crate::db::{Db, Dialect};
use crate::error::StoreError;

/// Postgres truncates identifiers past 63 bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

const INDEX_PREFIX: &str = "idx_";
const INDEX_SUFFIX: &str = "_modified_timestamp";

/// Longest table name whose derived index name still fits an identifier.
pub const MAX_TABLE_NAME_LEN: usize =
    MAX_IDENTIFIER_LEN - INDEX_PREFIX.len() - INDEX_SUFFIX.len();

/// The table name is spliced into SQL text, so only plain identifiers pass.
pub fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !starts_ok || !rest_ok || name.len() > MAX_TABLE_NAME_LEN {
        return Err(StoreError::InvalidTableName(name.to_string()));
    }
    Ok(())
}

pub fn index_name(table: &str) -> String {
    format!("{INDEX_PREFIX}{table}{INDEX_SUFFIX}")
}

/// DDL statements that provision `table` for `dialect`, in execution order.
///
/// MySQL has no `CREATE INDEX IF NOT EXISTS`, so its index is declared
/// inline, and its `data` column is `LONGTEXT` because `TEXT` stops at 64 KiB.
pub fn create_statements(table: &str, dialect: Dialect) -> Vec<String> {
    let index = index_name(table);

    match dialect {
        Dialect::MySql => vec![format!(
            r#"
CREATE TABLE IF NOT EXISTS {table} (
  id VARCHAR(32) NOT NULL,
  modified_timestamp BIGINT NOT NULL,
  data LONGTEXT NOT NULL,
  PRIMARY KEY (id),
  KEY {index} (modified_timestamp)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;
"#
        )],
        Dialect::Sqlite | Dialect::Postgres => vec![
            format!(
                r#"
CREATE TABLE IF NOT EXISTS {table} (
  id VARCHAR(32) NOT NULL PRIMARY KEY,
  modified_timestamp BIGINT NOT NULL,
  data TEXT NOT NULL
);
"#
            ),
            format!("CREATE INDEX IF NOT EXISTS {index} ON {table}(modified_timestamp);"),
        ],
    }
}

/// Idempotently create the session table and its expiry index.
#[instrument(skip(db), target = "schema", fields(dialect = ?db.dialect))]
pub async fn ensure_table(db: &Db, table: &str) -> Result<(), StoreError> {
    validate_table_name(table)?;

    for stmt in create_statements(table, db.dialect) {
        sqlx::query(&stmt).execute(&db.pool).await?;
    }

    debug!("session table ready");
    Ok(())
}
