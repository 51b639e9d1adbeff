//! Notification models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A broadcast notification, immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    /// Cohort routing key composed from year/branch/division/batch
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    pub sender_name: String,
    pub sent_by: String,
    pub notification_time: DateTime<Utc>,
}

/// Optional file attachment on a send request, content base64-encoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAttachment {
    pub file_name: String,
    pub content_base64: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Request body for sending a notification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sent_by: Option<String>,
    #[serde(default)]
    pub attachment: Option<NotificationAttachment>,
}

/// Compose the cohort topic from year/branch/division/batch.
///
/// "All" and empty values are filtered out; the remaining parts keep their
/// order and are joined with `-`. Selecting "All" everywhere yields an empty
/// topic, which addresses every cohort.
pub fn compose_topic(year: &str, branch: &str, division: &str, batch: &str) -> String {
    [year, branch, division, batch]
        .iter()
        .filter(|part| !part.is_empty() && **part != "All")
        .copied()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_filters_all_values() {
        assert_eq!(compose_topic("All", "CS", "All", "B2"), "CS-B2");
    }

    #[test]
    fn test_topic_keeps_order() {
        assert_eq!(compose_topic("2026", "IT", "D1", "B3"), "2026-IT-D1-B3");
    }

    #[test]
    fn test_topic_all_everywhere_is_empty() {
        assert_eq!(compose_topic("All", "All", "All", "All"), "");
    }

    #[test]
    fn test_topic_filters_empty_parts() {
        assert_eq!(compose_topic("", "CS", "", "All"), "CS");
    }
}
