//! Daily statistics ledger models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A per-day pass event counter in the daily statistics ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassCounter {
    IssuedPass,
    UpdatedPass,
    CancelledPass,
}

impl PassCounter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassCounter::IssuedPass => "issuedPass",
            PassCounter::UpdatedPass => "updatedPass",
            PassCounter::CancelledPass => "cancelledPass",
        }
    }
}

/// Counters for a single ledger date. Absent counters are implicitly zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsEntry {
    /// `DD/MM/YY`
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_pass: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_pass: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_pass: Option<i64>,
}

/// The daily statistics ledger in its original singleton-document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStats {
    pub stats: Vec<StatsEntry>,
}

/// Format a timestamp as a `DD/MM/YY` ledger date key.
pub fn date_key(when: DateTime<Utc>) -> String {
    when.format("%d/%m/%y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_key_format() {
        let when = Utc.with_ymd_and_hms(2026, 3, 7, 15, 30, 0).unwrap();
        assert_eq!(date_key(when), "07/03/26");
    }

    #[test]
    fn test_counter_names_match_document_fields() {
        assert_eq!(PassCounter::IssuedPass.as_str(), "issuedPass");
        assert_eq!(PassCounter::UpdatedPass.as_str(), "updatedPass");
        assert_eq!(PassCounter::CancelledPass.as_str(), "cancelledPass");
    }

    #[test]
    fn test_zero_counters_omitted() {
        let entry = StatsEntry {
            date: "01/01/26".to_string(),
            issued_pass: Some(2),
            updated_pass: None,
            cancelled_pass: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["issuedPass"], 2);
        assert!(json.get("updatedPass").is_none());
        assert!(json.get("cancelledPass").is_none());
    }
}
