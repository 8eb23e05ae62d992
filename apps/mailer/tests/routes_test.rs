//! Router tests over stand-in transports; nothing here touches the network.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use core_config::AppInfo;
use mail_dispatch::{Dispatcher, MailConfig};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "----mailer-test-boundary";

const INFO: AppInfo = AppInfo {
    name: "mailer",
    version: "0.1.0",
};

/// Builds `multipart/form-data` bodies by hand.
#[derive(Default)]
struct Form {
    body: Vec<u8>,
}

impl Form {
    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, filename: &str, content_type: &str, content: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"attachments\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn into_request(mut self) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri("/submit")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

fn basic_form() -> Form {
    Form::default()
        .text("to", "a@b.com")
        .text("subject", "Hi")
        .text("tbody", "Hello")
}

/// No credentials anywhere, so every provider but ethereal is unconfigured.
fn unconfigured_app() -> Router {
    mailer::app(Dispatcher::from_config(MailConfig::default()), INFO)
}

fn mock_app() -> Router {
    let config = MailConfig::default().with_force_stand_in(true);
    mailer::app(Dispatcher::from_config(config), INFO)
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_served_under_api() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(unconfigured_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["name"], "mailer");
}

#[tokio::test]
async fn providers_report_readiness_without_secrets() {
    let request = Request::builder()
        .uri("/api/providers")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(unconfigured_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    let gmail = rows.iter().find(|r| r["provider"] == "gmail").unwrap();
    assert_eq!(gmail["readiness"], "missing");
}

#[tokio::test]
async fn unconfigured_provider_succeeds_with_notice() {
    let (status, body) = call(unconfigured_app(), basic_form().into_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["provider"], "gmail");
    assert_eq!(body["credentialsUnavailable"], true);
    assert_eq!(body["accepted"][0], "a@b.com");
    assert_eq!(body["rejected"].as_array().unwrap().len(), 0);
    assert!(body["standInNotice"].as_str().unwrap().contains("configuration"));
}

#[tokio::test]
async fn mock_ethereal_returns_preview_url() {
    let request = basic_form().text("provider", "ethereal").into_request();

    let (status, body) = call(mock_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "ethereal");
    assert!(
        body["previewUrl"]
            .as_str()
            .unwrap()
            .starts_with("https://ethereal.email/message/")
    );
    assert!(body.get("credentialsUnavailable").is_none());
}

#[tokio::test]
async fn attachments_and_cc_are_accepted() {
    let request = basic_form()
        .text("cc", "c@d.com")
        .text("provider", "mailgun")
        .file("notes.txt", "text/plain", b"some notes")
        .file("empty.bin", "application/octet-stream", b"")
        .into_request();

    let (status, body) = call(mock_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accepted"], serde_json::json!(["a@b.com", "c@d.com"]));
}

#[tokio::test]
async fn missing_fields_are_a_bad_request() {
    let request = Form::default()
        .text("to", "a@b.com")
        .text("tbody", "Hello")
        .into_request();

    let (status, body) = call(unconfigured_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("subject"));
    assert_eq!(body["details"]["kind"], "validation_error");
}

#[tokio::test]
async fn unknown_provider_is_a_bad_request() {
    let request = basic_form().text("provider", "pigeon").into_request();

    let (status, body) = call(unconfigured_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("pigeon"));
}

#[tokio::test]
async fn more_than_three_files_are_rejected() {
    let request = (0..4)
        .fold(basic_form(), |form, i| {
            form.file(&format!("f{i}.txt"), "text/plain", b"x")
        })
        .into_request();

    let (status, body) = call(mock_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let big = vec![b'x'; 5 * 1024 * 1024 + 1];
    let request = basic_form()
        .file("big.bin", "application/octet-stream", &big)
        .into_request();

    let (status, body) = call(mock_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let request = Request::builder()
        .uri("/nowhere")
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(unconfigured_app(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
