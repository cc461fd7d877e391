use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("invalid session id: {0:?}")]
    InvalidSessionId(String),

    #[error("session store is closed")]
    Closed,

    #[error("unsupported database url: {0}")]
    UnsupportedDatabase(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
