use uuid::Uuid;

use crate::error::CoreError;

/// All record identifiers are UUIDs, assigned server-side (v7 for new rows).
pub type RecordId = Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Allocate a fresh, time-ordered record identifier.
pub fn new_record_id() -> RecordId {
    Uuid::now_v7()
}

/// Parse an identifier received over the wire.
///
/// `label` names the field in the error message, e.g. `"user"` produces
/// `"Invalid user ID"`.
pub fn parse_record_id(raw: &str, label: &str) -> Result<RecordId, CoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| CoreError::Validation(format!("Invalid {label} ID")))
}
