pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use db::{Db, Dialect};
pub use error::StoreError;
pub use store::SessionHandler;
pub use store::sql_store::SqlSessionStore;
