pub mod sql_store;

/// Session lifecycle as driven by the host: `open`, any number of
/// `read`/`write`, then `close`. `destroy` and `gc` may arrive at any point.
///
/// Nothing here returns an error. Failures surface as `false`, or as an
/// empty string from `read`, which the host treats as "no session data".
#[async_trait::async_trait]
pub trait SessionHandler: Send + Sync {
    /// Rebind the backing connection and sweep expired rows using the
    /// store's default max age.
    async fn open(&self, save_path: &str, session_name: &str) -> bool;

    /// Release the active connection. Always `true`.
    async fn close(&self) -> bool;

    /// Stored payload for `id`, or `""` when absent or on failure.
    async fn read(&self, id: &str) -> String;

    /// Insert or replace the payload for `id` and bump its modification time.
    async fn write(&self, id: &str, data: &str) -> bool;

    /// Remove `id`. Removing an unknown id succeeds.
    async fn destroy(&self, id: &str) -> bool;

    /// Remove every row older than `max_lifetime_secs`.
    async fn gc(&self, max_lifetime_secs: u64) -> bool;
}
