//!
//! src/normalize.rs  Andrew Belles  Oct 17th, 2026
//!
//! Coercion helpers shared by both backends. Metadata is never worth
//! blocking the player over so nothing in here fails, bad input is 0
//!

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Integer text to i32, anything unparsable (empty, "4.5", overflow) is 0
pub fn coerce_int(raw: &str) -> i32 {
    raw.trim().parse::<i32>().unwrap_or(0)
}

/// Whole seconds to a Duration, negatives and garbage are zero
pub fn coerce_seconds(raw: &str) -> Duration {
    seconds_from(raw.trim().parse::<i64>().unwrap_or(0))
}

/// Largest second count kept, anything above degrades to zero like an
/// i32 overflow does in `coerce_int`
pub const MAX_SECONDS: i64 = i32::MAX as i64;

pub fn seconds_from(secs: i64) -> Duration {
    if (0..=MAX_SECONDS).contains(&secs) {
        Duration::from_secs(secs as u64)
    } else {
        Duration::ZERO
    }
}

/// Wall clock instant the current song started at. `played` is expected
/// to come from `seconds_from`, which keeps the subtraction in range
pub fn start_time(now: DateTime<Utc>, played: Duration) -> DateTime<Utc> {
    let played = TimeDelta::from_std(played).unwrap_or(TimeDelta::zero());
    now.checked_sub_signed(played).unwrap_or(now)
}
