use std::sync::atomic::{AtomicI64, Ordering};

use crate::model::Timestamp;

/// Source of "now" for modification stamps and expiry cutoffs.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> Timestamp;
}

/// Wall clock, unix seconds in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to. Used to simulate session ageing.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
