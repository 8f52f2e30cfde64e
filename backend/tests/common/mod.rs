//! Shared helpers for the HTTP tests.
//! Note: #[allow(dead_code)] because each test file compiles common/ separately.

#![allow(dead_code)]

use atmos::api::pages::PageOptions;
use atmos::server::{create_router, AppState};
use atmos::{PaymentRedirector, SessionStore, SubmissionController, WebhookClient};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use bytes::Bytes;
use reqwest::Url;
use std::time::Duration;
use uuid::Uuid;

pub const PAYMENT_LINK: &str = "https://buy.example/test_link";

/// Static-link payment, as in the default deployment.
pub fn static_link() -> PaymentRedirector {
    PaymentRedirector::StaticLink(Url::parse(PAYMENT_LINK).unwrap())
}

/// App wired to the given webhook URL.
pub fn test_app(webhook_url: &str, payment: PaymentRedirector) -> (TestServer, AppState) {
    test_app_with_limit(webhook_url, payment, 10 * 1024 * 1024)
}

/// Same as [`test_app`] with a custom request body cap.
pub fn test_app_with_limit(
    webhook_url: &str,
    payment: PaymentRedirector,
    max_upload_bytes: usize,
) -> (TestServer, AppState) {
    let webhook =
        WebhookClient::new(Url::parse(webhook_url).unwrap(), Duration::from_secs(5)).unwrap();
    let state = AppState {
        controller: SubmissionController::new(webhook, payment),
        sessions: SessionStore::new(chrono::Duration::minutes(10)),
        pages: PageOptions { auto_redirect: true },
    };
    let server = TestServer::new(create_router(state.clone(), max_upload_bytes)).unwrap();
    (server, state)
}

/// Open a session with a first page load; returns the `Cookie` header value and id.
pub async fn open_session(server: &TestServer) -> (String, Uuid) {
    let response = server.get("/").await;
    assert_eq!(response.status_code(), 200);
    cookie_from(&response)
}

pub fn cookie_from(response: &TestResponse) -> (String, Uuid) {
    let set_cookie = response.header("set-cookie");
    let pair = set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let id = Uuid::parse_str(pair.split_once('=').unwrap().1).unwrap();
    (pair, id)
}

pub fn wav_part(name: &str) -> Part {
    Part::bytes(Bytes::from_static(b"RIFF\x24\x00\x00\x00WAVEfmt "))
        .file_name(name.to_string())
        .mime_type("audio/wav")
}

/// Complete, valid form.
pub fn valid_form() -> MultipartForm {
    MultipartForm::new()
        .add_part("audioFiles", wav_part("take1.wav"))
        .add_part("audioFiles", wav_part("take2.wav"))
        .add_text("email", "artist@example.com")
        .add_text("mix_wideness", "70")
        .add_text("output_formats", "2.0 Stereo")
        .add_text("output_formats", "Binaural")
        .add_text("content_types", "Music content")
}

pub async fn get_page(server: &TestServer, cookie: &str) -> String {
    let response = server.get("/").add_header("cookie", cookie.to_string()).await;
    assert_eq!(response.status_code(), 200);
    response.text()
}

pub async fn session_json(server: &TestServer, cookie: &str) -> serde_json::Value {
    server
        .get("/api/session")
        .add_header("cookie", cookie.to_string())
        .await
        .json::<serde_json::Value>()
}
