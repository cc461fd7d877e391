use crate::error::StoreError;

/// Unix timestamp in whole seconds.
pub type Timestamp = i64;

/// Upper bound on session id length, matching the `VARCHAR(32)` key column.
pub const MAX_SESSION_ID_LEN: usize = 32;

/// Rows with `modified_timestamp` strictly below the returned value are expired.
///
/// Both the sweep in `open` and `gc` go through this function.
pub fn expiry_cutoff(now: Timestamp, max_age_secs: u64) -> Timestamp {
    let max_age = Timestamp::try_from(max_age_secs).unwrap_or(Timestamp::MAX);
    now.saturating_sub(max_age)
}

pub fn validate_session_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty() || id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(StoreError::InvalidSessionId(id.to_string()));
    }
    Ok(())
}
