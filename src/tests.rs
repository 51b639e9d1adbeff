//! Integration tests for the concession backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::blob::BlobStore;
use crate::db::{init_database, Repository};
use crate::history::{HistoryLog, HISTORY_LOG_PATH};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    blobs: Arc<BlobStore>,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let blob_root = temp_dir.path().join("blobs");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Bind to random port first so the public URL matches the listener
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Initialize blob store and history log
        let blobs = Arc::new(
            BlobStore::open(&blob_root, &base_url)
                .await
                .expect("Failed to init blob store"),
        );
        let history = Arc::new(HistoryLog::new((*blobs).clone()));

        let state = AppState {
            repo,
            blobs: blobs.clone(),
            history,
        };

        let app = create_router(state);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            blobs,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a fresh application for `student_id`.
    async fn create_application(&self, student_id: &str) {
        let resp = self
            .client
            .post(self.url("/api/passes"))
            .json(&application_body(student_id))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    /// Register an application and issue it a pass with the given number.
    async fn issue_pass(&self, student_id: &str, certificate_number: &str) {
        self.create_application(student_id).await;
        let resp = self
            .client
            .post(self.url(&format!("/api/passes/{}/issue", student_id)))
            .json(&json!({ "certificateNumber": certificate_number }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    async fn get_pass(&self, student_id: &str) -> Value {
        let resp = self
            .client
            .get(self.url(&format!("/api/passes/{}", student_id)))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json::<Value>().await.unwrap()["data"].clone()
    }

    async fn get_stats(&self) -> Value {
        let resp = self
            .client
            .get(self.url("/api/stats"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json::<Value>().await.unwrap()["data"].clone()
    }
}

fn application_body(student_id: &str) -> Value {
    json!({
        "studentId": student_id,
        "firstName": "Asha",
        "middleName": "R",
        "lastName": "Patil",
        "gender": "Female",
        "dob": "2004-06-15",
        "address": "12 Hill Road, Bandra",
        "phoneNum": 9876543210i64,
        "from": "Bandra",
        "to": "Churchgate",
        "branch": "CS",
        "gradYear": "2026",
        "class": "I",
        "duration": "Monthly",
        "travelLane": "Western"
    })
}

fn edit_body() -> Value {
    json!({
        "firstName": "Asha",
        "middleName": "R",
        "lastName": "Patil",
        "gender": "Female",
        "dob": "2004-06-15",
        "address": "14 Hill Road, Bandra",
        "phoneNum": "9876543210",
        "from": "Bandra",
        "to": "Churchgate",
        "branch": "CS",
        "gradYear": "2026",
        "class": "I",
        "duration": "Monthly",
        "travelLane": "Western",
        "dateOfIssue": "2026-08-28T10:00:00Z"
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_get_pass_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/passes/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_pass_flow() {
    let fixture = TestFixture::new().await;
    fixture.create_application("s1").await;

    let resp = fixture
        .client
        .put(fixture.url("/api/passes/s1"))
        .json(&edit_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let record = fixture.get_pass("s1").await;
    assert_eq!(record["details"]["address"], "14 Hill Road, Bandra");
    assert_eq!(record["details"]["phoneNum"], 9876543210i64);
    let issued = record["details"]["lastPassIssued"].as_str().unwrap();
    assert!(issued.starts_with("2026-08-28T10:00:00"));
    assert_eq!(record["request"]["passCollected"]["collected"], "1");

    let stats = fixture.get_stats().await;
    assert_eq!(stats["stats"][0]["updatedPass"], 1);
}

#[tokio::test]
async fn test_update_pass_invalid_phone_rejected_before_write() {
    let fixture = TestFixture::new().await;
    fixture.create_application("s1").await;

    for bad_phone in ["12345", "12345678901", "12345abcde"] {
        let mut body = edit_body();
        body["phoneNum"] = json!(bad_phone);
        body["address"] = json!("99 Changed Street");

        let resp = fixture
            .client
            .put(fixture.url("/api/passes/s1"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let error: Value = resp.json().await.unwrap();
        assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    }

    // No write happened: the address edit never landed and no stat was recorded
    let record = fixture.get_pass("s1").await;
    assert_eq!(record["details"]["address"], "12 Hill Road, Bandra");
    let stats = fixture.get_stats().await;
    assert!(stats["stats"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_pass_missing_fields_listed() {
    let fixture = TestFixture::new().await;
    fixture.create_application("s1").await;

    let mut body = edit_body();
    body["gender"] = json!("");
    body.as_object_mut().unwrap().remove("branch");

    let resp = fixture
        .client
        .put(fixture.url("/api/passes/s1"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let error: Value = resp.json().await.unwrap();
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    let message = error["error"]["message"].as_str().unwrap();
    assert!(message.contains("gender"));
    assert!(message.contains("branch"));
}

#[tokio::test]
async fn test_sequential_updates_accumulate_in_ledger() {
    let fixture = TestFixture::new().await;
    fixture.create_application("s1").await;

    for _ in 0..3 {
        let resp = fixture
            .client
            .put(fixture.url("/api/passes/s1"))
            .json(&edit_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let stats = fixture.get_stats().await;
    let entries = stats["stats"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["updatedPass"], 3);
    // Zero counters are omitted, not serialized as 0
    assert!(entries[0].get("cancelledPass").is_none());
}

#[tokio::test]
async fn test_cancel_pass_scenario() {
    let fixture = TestFixture::new().await;
    fixture.issue_pass("s1", "Z100").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/passes/s1/cancel"))
        .json(&json!({ "reason": "duplicate" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let record = fixture.get_pass("s1").await;
    assert_eq!(record["details"]["status"], "rejected");
    assert_eq!(record["details"]["statusMessage"], "duplicate");
    assert_eq!(record["request"]["status"], "rejected");
    assert!(record["request"].get("passCollected").is_none());

    // Latest history entry for the certificate is cancelled
    let resp = fixture
        .client
        .get(fixture.url("/api/certificates/Z100"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let found: Value = resp.json().await.unwrap();
    assert_eq!(found["data"]["status"], "cancelled");

    let stats = fixture.get_stats().await;
    assert_eq!(stats["stats"][0]["cancelledPass"], 1);
}

#[tokio::test]
async fn test_cancel_pass_blank_reason_gets_default_message() {
    let fixture = TestFixture::new().await;
    fixture.issue_pass("s1", "Z100").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/passes/s1/cancel"))
        .json(&json!({ "reason": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let record = fixture.get_pass("s1").await;
    assert_eq!(
        record["details"]["statusMessage"],
        "Your form has been cancelled"
    );
}

#[tokio::test]
async fn test_cancel_pass_missing_history_match_still_proceeds() {
    let fixture = TestFixture::new().await;
    fixture.issue_pass("s1", "Z100").await;

    // Blow away the history log so the certificate has no entry
    fixture.blobs.put(HISTORY_LOG_PATH, b"[]").await.unwrap();

    let resp = fixture
        .client
        .post(fixture.url("/api/passes/s1/cancel"))
        .json(&json!({ "reason": "duplicate" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let record = fixture.get_pass("s1").await;
    assert_eq!(record["details"]["status"], "rejected");

    let stats = fixture.get_stats().await;
    assert_eq!(stats["stats"][0]["cancelledPass"], 1);
}

#[tokio::test]
async fn test_certificate_search_not_found() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/certificates/Z999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_certificate_update_flow() {
    let fixture = TestFixture::new().await;
    fixture.issue_pass("s1", "Z100").await;

    let resp = fixture
        .client
        .put(fixture.url("/api/certificates/Z100"))
        .json(&json!({ "newCertificateNumber": "Z200" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let result: Value = resp.json().await.unwrap();
    assert_eq!(result["data"]["historyEntriesRewritten"], 1);
    assert_eq!(result["data"]["detailsUpdated"], 1);
    assert_eq!(result["data"]["requestsUpdated"], 1);

    // Documents now carry the new number
    let record = fixture.get_pass("s1").await;
    assert_eq!(record["details"]["certificateNumber"], "Z200");
    assert_eq!(record["request"]["passNum"], "Z200");

    // History is searchable under the new number only
    let resp = fixture
        .client
        .get(fixture.url("/api/certificates/Z200"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = fixture
        .client
        .get(fixture.url("/api/certificates/Z100"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_certificate_update_same_number_still_counts() {
    let fixture = TestFixture::new().await;
    fixture.issue_pass("s1", "Z100").await;

    let resp = fixture
        .client
        .put(fixture.url("/api/certificates/Z100"))
        .json(&json!({ "newCertificateNumber": "Z100" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // No effective change, but the ledger still records an updated pass
    let stats = fixture.get_stats().await;
    assert_eq!(stats["stats"][0]["updatedPass"], 1);
}

#[tokio::test]
async fn test_malformed_history_log_reported() {
    let fixture = TestFixture::new().await;
    fixture
        .blobs
        .put(HISTORY_LOG_PATH, b"{\"oops\": true}")
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/certificates/Z100"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "MALFORMED_LOG");
}

#[tokio::test]
async fn test_send_notification_topic_composition() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!({
            "title": "Exam schedule",
            "message": "Schedule attached",
            "year": "All",
            "branch": "CS",
            "division": "All",
            "batch": "B2",
            "senderName": "Prof. Rao",
            "sentBy": "prof-rao"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["topic"], "CS-B2");
    assert!(body["data"].get("attachments").is_none());
}

#[tokio::test]
async fn test_send_notification_missing_field_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!({
            "title": "Exam schedule",
            "message": "",
            "year": "All",
            "branch": "CS",
            "division": "All",
            "batch": "B2",
            "senderName": "Prof. Rao",
            "sentBy": "prof-rao"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Nothing was written
    let resp = fixture
        .client
        .get(fixture.url("/api/notifications"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_notification_with_attachment() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/notifications"))
        .json(&json!({
            "title": "timetable",
            "message": "See attachment",
            "year": "2026",
            "branch": "IT",
            "division": "D1",
            "batch": "All",
            "senderName": "Prof. Rao",
            "sentBy": "prof-rao",
            "attachment": {
                "fileName": "timetable.txt",
                "contentBase64": "aGVsbG8gdGltZXRhYmxl"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["topic"], "2026-IT-D1");

    // The attachment URL resolves through the blob serving route
    let url = body["data"]["attachments"][0].as_str().unwrap().to_string();
    let resp = fixture.client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "hello timetable");
}

#[tokio::test]
async fn test_issue_pass_records_history_and_stats() {
    let fixture = TestFixture::new().await;
    fixture.issue_pass("s1", "Z100").await;

    let record = fixture.get_pass("s1").await;
    assert_eq!(record["details"]["status"], "approved");
    assert_eq!(record["details"]["certificateNumber"], "Z100");
    assert_eq!(record["request"]["passNum"], "Z100");

    let resp = fixture
        .client
        .get(fixture.url("/api/certificates/Z100"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let found: Value = resp.json().await.unwrap();
    assert_eq!(found["data"]["status"], "active");
    assert_eq!(found["data"]["firstName"], "Asha");

    let stats = fixture.get_stats().await;
    assert_eq!(stats["stats"][0]["issuedPass"], 1);
}
