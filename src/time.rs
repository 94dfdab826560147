use chrono::{DateTime, Duration, Utc};

use crate::{Error, Result};

pub type Timestamp = DateTime<Utc>;

pub fn now() -> Timestamp {
    Utc::now()
}

/// Returns `from + ttl`, failing when `ttl` does not fit a timestamp.
pub fn deadline_after(from: Timestamp, ttl: std::time::Duration) -> Result<Timestamp> {
    let ttl = Duration::from_std(ttl)
        .map_err(|_| Error::Config(format!("expiry of {ttl:?} is out of range")))?;

    from.checked_add_signed(ttl)
        .ok_or_else(|| Error::Config(format!("expiry of {ttl} overflows the clock")))
}

/// Time left until `deadline`, clamped at zero.
pub fn remaining(deadline: Timestamp, now: Timestamp) -> Duration {
    if now < deadline {
        deadline.signed_duration_since(now)
    } else {
        Duration::zero()
    }
}
