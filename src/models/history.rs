//! History log record model.

use serde::{Deserialize, Serialize};

/// Pass status values carried in history records.
pub mod pass_status {
    pub const ACTIVE: &str = "active";
    pub const CANCELLED: &str = "cancelled";
}

/// One entry in the concession history log blob.
///
/// `certificate_number` and `pass_num` carry the same value in practice; both
/// are kept because the source documents stored both. Unknown fields present in
/// an existing log are preserved across rewrites via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub certificate_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_num: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pass_issued: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = r#"{"certificateNumber":"Z100","status":"active","branch":"CS"}"#;
        let record: HistoryRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.certificate_number, "Z100");
        assert_eq!(record.extra["branch"], "CS");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["branch"], "CS");
    }
}
