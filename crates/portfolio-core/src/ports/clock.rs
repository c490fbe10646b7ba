//! Time source port.

use chrono::{DateTime, Utc};

/// Time source for timestamps written to the store.
///
/// Makes the "timestamp equals local write time" rule testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
