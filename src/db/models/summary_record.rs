use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored notebook, as listed for the record overview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecordInfo {
    pub record_id: String,
    pub block_count: u64,
    /// Number of blocks whose snapshot shows up as history.
    pub versioned_count: u64,
    pub updated_at: DateTime<Utc>,
}
