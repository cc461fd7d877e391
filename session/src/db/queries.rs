use crate::db::Dialect;

/// SQL text for each store operation, rendered once per table and dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queries {
    pub read: String,
    pub write: String,
    pub destroy: String,
    pub sweep: String,
}

impl Queries {
    /// `table` must already have passed `schema::validate_table_name`.
    pub fn render(table: &str, dialect: Dialect) -> Self {
        let p = |n| dialect.placeholder(n);

        let read = format!("SELECT data FROM {table} WHERE id = {};", p(1));

        // The stored stamp never moves backwards, even if the clock does.
        let write = match dialect {
            Dialect::MySql => format!(
                r#"
INSERT INTO {table} (id, modified_timestamp, data)
VALUES ({}, {}, {})
ON DUPLICATE KEY UPDATE
  data = VALUES(data),
  modified_timestamp = GREATEST(modified_timestamp, VALUES(modified_timestamp));
"#,
                p(1),
                p(2),
                p(3)
            ),
            Dialect::Sqlite | Dialect::Postgres => format!(
                r#"
INSERT INTO {table} (id, modified_timestamp, data)
VALUES ({}, {}, {})
ON CONFLICT (id) DO UPDATE SET
  data = excluded.data,
  modified_timestamp = CASE
    WHEN excluded.modified_timestamp > {table}.modified_timestamp
      THEN excluded.modified_timestamp
    ELSE {table}.modified_timestamp
  END;
"#,
                p(1),
                p(2),
                p(3)
            ),
        };

        let destroy = format!("DELETE FROM {table} WHERE id = {};", p(1));

        let sweep = format!(
            "DELETE FROM {table} WHERE modified_timestamp < {};",
            p(1)
        );

        Self {
            read,
            write,
            destroy,
            sweep,
        }
    }
}
