//! Staleness check: does a project need refreshing this cycle?

use chrono::{DateTime, Utc};

use crate::settings::StalenessRule;

/// Decide whether a project must be refreshed.
///
/// A project that was never imported always needs a refresh. Otherwise the
/// remote modification time is compared with the local import time using
/// `rule`. The local time is the service's own write time, so under
/// [`StalenessRule::Inclusive`] a remote timestamp equal to it re-triggers.
pub fn needs_refresh(
    local_updated_at: Option<DateTime<Utc>>,
    remote_last_modified: DateTime<Utc>,
    rule: StalenessRule,
) -> bool {
    let Some(local) = local_updated_at else {
        return true;
    };

    match rule {
        StalenessRule::Inclusive => remote_last_modified >= local,
        StalenessRule::Strict => remote_last_modified > local,
    }
}
