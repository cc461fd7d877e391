mod init;
mod timing;

pub use init::init_logger;
pub use timing::warn_if_slow;
