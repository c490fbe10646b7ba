//! DTOs returned by the repository host port.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository metadata needed for the staleness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    /// Last time the host reports the repository as modified.
    pub last_modified: DateTime<Utc>,
    /// Canonical browser URL of the repository.
    pub html_url: String,
}
