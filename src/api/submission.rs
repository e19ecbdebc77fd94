//! Submission Client
//!
//! Posts a completed booking to `/appointment/book`. Bookings without an
//! attachment go as JSON; with an attachment the same fields are sent as
//! a multipart form plus a `customDesignImage` file part.
//!
//! Every non-success outcome collapses into [`BookingError::Submission`]
//! carrying a message fit to show the user. There is no automatic retry.

use super::types::{BookingReceipt, BookingRequest};
use super::{BookingSubmitter, build_http_client, endpoint};
use crate::error::{BookingError, Result};
use crate::utils::truncate_str;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

const BOOK_PATH: &str = "/appointment/book";
const ATTACHMENT_FIELD: &str = "customDesignImage";
const MAX_ERROR_BODY_BYTES: usize = 200;

/// `message` may be a string or, for validation rejections, a list
#[derive(Deserialize)]
#[serde(untagged)]
enum ServerMessage {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct ServerReply {
    #[serde(default)]
    message: Option<ServerMessage>,
}

impl ServerReply {
    fn message(self) -> Option<String> {
        match self.message? {
            ServerMessage::One(msg) => Some(msg),
            ServerMessage::Many(msgs) if !msgs.is_empty() => Some(msgs.join("; ")),
            ServerMessage::Many(_) => None,
        }
    }
}

/// Best user-facing message for a rejected booking
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(reply) = serde_json::from_str::<ServerReply>(body)
        && let Some(message) = reply.message()
    {
        return message;
    }
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        truncate_str(body, MAX_ERROR_BODY_BYTES).to_string()
    }
}

pub struct SubmissionClient {
    http: Client,
    url: String,
}

impl SubmissionClient {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self> {
        Ok(Self::with_client(build_http_client(timeout_secs)?, base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            url: endpoint(base_url, BOOK_PATH),
        }
    }

    fn multipart_form(request: &BookingRequest) -> Result<Form> {
        let mut form = Form::new();
        for (field, value) in request.payload.form_fields() {
            form = form.text(field, value);
        }
        if let Some(attachment) = &request.attachment {
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.file_name.clone())
                .mime_str(&attachment.content_type)
                .map_err(|e| {
                    BookingError::Submission(format!(
                        "Invalid image type '{}': {}",
                        attachment.content_type, e
                    ))
                })?;
            form = form.part(ATTACHMENT_FIELD, part);
        }
        Ok(form)
    }
}

#[async_trait]
impl BookingSubmitter for SubmissionClient {
    async fn submit(&self, request: &BookingRequest) -> Result<BookingReceipt> {
        let builder = self.http.post(&self.url);
        let builder = if request.is_multipart() {
            tracing::debug!("Submitting booking as multipart to {}", self.url);
            builder.multipart(Self::multipart_form(request)?)
        } else {
            tracing::debug!("Submitting booking as JSON to {}", self.url);
            builder.json(&request.payload)
        };

        let response = builder
            .send()
            .await
            .map_err(|e| BookingError::Submission(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = rejection_message(status, &body);
            tracing::warn!("Booking rejected ({}): {}", status, message);
            return Err(BookingError::Submission(message));
        }

        let message = serde_json::from_str::<ServerReply>(&body)
            .ok()
            .and_then(ServerReply::message);
        tracing::info!("Booking accepted for {}", request.payload.date);

        Ok(BookingReceipt { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Attachment, BookingPayload};
    use crate::error::ErrorCode;
    use mockito::Matcher;

    fn request(attachment: Option<Attachment>) -> BookingRequest {
        BookingRequest {
            payload: BookingPayload {
                name: "Jess".into(),
                email: Some("jess@example.com".into()),
                phone: None,
                core_services: vec!["Full Set Gel-X Extension".into()],
                add_ons: vec![],
                removals: vec!["Gel-X Removal".into()],
                level: None,
                date: "10/06/2024".into(),
                time: Some("14:00".into()),
            },
            attachment,
        }
    }

    #[tokio::test]
    async fn test_submit_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/appointment/book")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJsonString(
                r#"{"name":"Jess","date":"10/06/2024","time":"14:00",
                    "coreServices":["Full Set Gel-X Extension"],"removals":["Gel-X Removal"]}"#
                    .to_string(),
            ))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "message": "Booking request received"}"#)
            .create_async()
            .await;

        let client = SubmissionClient::new(&server.url(), None).unwrap();
        let receipt = client.submit(&request(None)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(receipt.message.as_deref(), Some("Booking request received"));
    }

    #[tokio::test]
    async fn test_submit_multipart_with_image() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/appointment/book")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="customDesignImage"; filename="inspo.png""#.to_string()),
                Matcher::Regex(r#"name="coreServices""#.to_string()),
                Matcher::Regex("10/06/2024".to_string()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let attachment = Attachment::new("inspo.png", "image/png", b"fake-png-bytes".to_vec());
        let client = SubmissionClient::new(&server.url(), None).unwrap();
        let receipt = client.submit(&request(Some(attachment))).await.unwrap();

        mock.assert_async().await;
        assert!(receipt.message.is_none());
    }

    #[tokio::test]
    async fn test_rejection_uses_server_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/appointment/book")
            .with_status(409)
            .with_header("content-type", "application/json")
            .with_body(r#"{"statusCode": 409, "message": "This slot has just been taken"}"#)
            .create_async()
            .await;

        let client = SubmissionClient::new(&server.url(), None).unwrap();
        let err = client.submit(&request(None)).await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.code(), ErrorCode::SubmissionFailed);
        assert_eq!(err.to_string(), "Booking failed: This slot has just been taken");
    }

    #[tokio::test]
    async fn test_rejection_joins_message_list() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/appointment/book")
            .with_status(400)
            .with_body(r#"{"message": ["email must be an email", "date is invalid"]}"#)
            .create_async()
            .await;

        let client = SubmissionClient::new(&server.url(), None).unwrap();
        let err = client.submit(&request(None)).await.unwrap_err();

        mock.assert_async().await;
        assert!(err.to_string().contains("email must be an email; date is invalid"));
    }

    #[tokio::test]
    async fn test_rejection_without_body_reports_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/appointment/book")
            .with_status(500)
            .create_async()
            .await;

        let client = SubmissionClient::new(&server.url(), None).unwrap();
        let err = client.submit(&request(None)).await.unwrap_err();

        mock.assert_async().await;
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_rejection_message_truncates_plain_body() {
        let body = "x".repeat(1000);
        let message = rejection_message(reqwest::StatusCode::BAD_GATEWAY, &body);
        assert_eq!(message.len(), MAX_ERROR_BODY_BYTES);
    }

    #[test]
    fn test_invalid_mime_is_rejected_locally() {
        let attachment = Attachment::new("inspo", "not a mime", vec![1]);
        let result = SubmissionClient::multipart_form(&request(Some(attachment)));
        assert!(result.is_err());
    }
}
