//! Notification broadcast endpoints.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{compose_topic, Notification, SendNotificationRequest};
use crate::AppState;

/// POST /api/notifications - Broadcast a notification to a student cohort.
///
/// All fields except the attachment are required. When an attachment is
/// present it is uploaded to the blob store first and its download URL
/// becomes the notification's single attachment. The topic is composed from
/// year/branch/division/batch with "All" values filtered out.
pub async fn send_notification(
    State(state): State<AppState>,
    Json(request): Json<SendNotificationRequest>,
) -> ApiResult<Notification> {
    let required = [
        request.title.as_deref(),
        request.message.as_deref(),
        request.year.as_deref(),
        request.branch.as_deref(),
        request.division.as_deref(),
        request.batch.as_deref(),
        request.sender_name.as_deref(),
        request.sent_by.as_deref(),
    ];
    if required.iter().any(|v| v.is_none_or(|s| s.trim().is_empty())) {
        return Err(AppError::Validation(
            "Please fill all required fields.".to_string(),
        ));
    }

    let title = request.title.unwrap_or_default();
    let sent_by = request.sent_by.unwrap_or_default();

    let attachments = match &request.attachment {
        Some(attachment) => {
            let contents = BASE64.decode(&attachment.content_base64).map_err(|e| {
                AppError::BadRequest(format!("Attachment is not valid base64: {}", e))
            })?;
            let path = format!("notification/{}/{}", sent_by, title);
            tracing::debug!(
                file_name = %attachment.file_name,
                content_type = ?attachment.content_type,
                path = %path,
                "Uploading notification attachment"
            );
            state.blobs.put(&path, &contents).await?;
            Some(vec![state.blobs.url_for(&path)])
        }
        None => None,
    };

    let topic = compose_topic(
        request.year.as_deref().unwrap_or_default(),
        request.branch.as_deref().unwrap_or_default(),
        request.division.as_deref().unwrap_or_default(),
        request.batch.as_deref().unwrap_or_default(),
    );

    let notification = Notification {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        message: request.message.unwrap_or_default(),
        topic,
        attachments,
        sender_name: request.sender_name.unwrap_or_default(),
        sent_by,
        notification_time: Utc::now(),
    };

    state.repo.insert_notification(&notification).await?;

    tracing::info!(topic = %notification.topic, "Notification sent");
    success(notification)
}

/// GET /api/notifications - List sent notifications, newest first.
pub async fn list_notifications(State(state): State<AppState>) -> ApiResult<Vec<Notification>> {
    let notifications = state.repo.list_notifications().await?;
    success(notifications)
}
