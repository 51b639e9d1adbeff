//! Concession pass record models.
//!
//! `ConcessionDetails` holds a student's pass data; `ConcessionRequest` mirrors a
//! subset of it for workflow-state tracking. Records are created when a student
//! applies and are only ever updated afterwards, never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of a concession record.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const APPROVED: &str = "approved";
    pub const REJECTED: &str = "rejected";
}

/// Default status message applied when a pass is cancelled without a reason.
pub const DEFAULT_CANCEL_MESSAGE: &str = "Your form has been cancelled";

/// A student's concession pass record, keyed by student id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcessionDetails {
    pub student_id: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: String,
    pub dob: String,
    pub address: String,
    /// Stored as an integer, per the source documents
    pub phone_num: i64,
    pub from: String,
    pub to: String,
    pub branch: String,
    pub grad_year: String,
    pub class: String,
    pub duration: String,
    pub travel_lane: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pass_issued: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// Pass collection marker on a concession request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassCollected {
    /// "0" or "1", per the source documents
    pub collected: String,
    pub date: DateTime<Utc>,
}

/// Request-state mirror of a concession record, keyed by student id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcessionRequest {
    pub student_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_collected: Option<PassCollected>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_num: Option<String>,
}

/// Combined view returned by the pass fetch endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassRecord {
    pub details: ConcessionDetails,
    pub request: ConcessionRequest,
}

/// Request body for submitting a pass edit.
///
/// Field names mirror the edit form; `date_of_issue` lands in storage as
/// `lastPassIssued` and `phone_num` arrives as the raw form string so it can be
/// validated before coercion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_num: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub grad_year: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub travel_lane: Option<String>,
    #[serde(default)]
    pub date_of_issue: Option<DateTime<Utc>>,
}

impl super::FormValues for UpdatePassRequest {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "firstName" => self.first_name.as_deref(),
            "middleName" => self.middle_name.as_deref(),
            "lastName" => self.last_name.as_deref(),
            "gender" => self.gender.as_deref(),
            "dob" => self.dob.as_deref(),
            "address" => self.address.as_deref(),
            "phoneNum" => self.phone_num.as_deref(),
            "from" => self.from.as_deref(),
            "to" => self.to.as_deref(),
            "branch" => self.branch.as_deref(),
            "gradYear" => self.grad_year.as_deref(),
            "class" => self.class.as_deref(),
            "duration" => self.duration.as_deref(),
            "travelLane" => self.travel_lane.as_deref(),
            _ => None,
        }
    }
}

/// Request body for registering a new concession application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub student_id: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub gender: String,
    pub dob: String,
    pub address: String,
    pub phone_num: i64,
    pub from: String,
    pub to: String,
    pub branch: String,
    pub grad_year: String,
    pub class: String,
    pub duration: String,
    pub travel_lane: String,
}

impl CreateApplicationRequest {
    /// Build the initial document pair for a fresh application.
    pub fn into_records(self) -> (ConcessionDetails, ConcessionRequest) {
        let details = ConcessionDetails {
            student_id: self.student_id.clone(),
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            gender: self.gender,
            dob: self.dob,
            address: self.address,
            phone_num: self.phone_num,
            from: self.from,
            to: self.to,
            branch: self.branch,
            grad_year: self.grad_year,
            class: self.class,
            duration: self.duration,
            travel_lane: self.travel_lane,
            certificate_number: None,
            last_pass_issued: None,
            status: status::PENDING.to_string(),
            status_message: None,
        };
        let request = ConcessionRequest {
            student_id: self.student_id,
            status: status::PENDING.to_string(),
            status_message: None,
            pass_collected: None,
            pass_num: None,
        };
        (details, request)
    }
}

/// Request body for cancelling a pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPassRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for issuing a new pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePassRequest {
    pub certificate_number: String,
}

/// Request body for correcting a certificate number.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCertificateRequest {
    pub new_certificate_number: String,
}
