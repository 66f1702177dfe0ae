//! Cutoff timestamp handed to the client

use chrono::{DateTime, Utc};

/// How far back the cutoff lies from "now"
pub const CUTOFF_LOOKBACK_SECS: i64 = 86_400;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// One day before `now`, as whole UNIX-epoch seconds in decimal.
///
/// The client owns the meaning of this value.
pub fn cutoff_timestamp(now: DateTime<Utc>) -> String {
    (now.timestamp() - CUTOFF_LOOKBACK_SECS).to_string()
}
