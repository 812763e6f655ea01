use dockcheck_core::{Report, Timestamp};
use serde::{Deserialize, Serialize};

/// A report as stored in the backend, with its write version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub report: Report,
    /// 0 on insert, +1 on every accepted replace.
    pub version: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: Timestamp,
}
