//! Conversion webhook client.
//!
//! One POST per submit, never retried. Every outcome is classified into a
//! [`SubmissionResult`]; this client does not return errors.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atmos::WebhookClient;
//!
//! let client = WebhookClient::new(endpoint, Duration::from_secs(30))?;
//! match client.submit(&request).await {
//!     SubmissionResult::Success => { /* go to payment */ }
//!     other => { /* show failure */ }
//! }
//! ```

use reqwest::{StatusCode, Url};
use std::error::Error as _;
use std::time::Duration;

use crate::models::{SubmissionRequest, SubmissionResult};
use crate::submission::build_form;

/// Outbound timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the conversion webhook.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl WebhookClient {
    /// Create a client posting to `endpoint`, bounded by `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the request once and classify the outcome.
    pub async fn submit(&self, request: &SubmissionRequest) -> SubmissionResult {
        let form = match build_form(request) {
            Ok(form) => form,
            Err(e) => return SubmissionResult::NetworkError(describe_error(&e)),
        };

        tracing::info!(
            endpoint = %self.endpoint,
            files = request.files.len(),
            bytes = request.files.iter().map(|f| f.content.len()).sum::<usize>(),
            "Posting submission to webhook"
        );

        let outcome = match self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => classify(response.status()),
            Err(e) => SubmissionResult::NetworkError(describe_error(&e)),
        };

        match &outcome {
            SubmissionResult::Success => tracing::info!("Webhook accepted submission"),
            SubmissionResult::Rejected(status) => {
                tracing::warn!(status = *status, "Webhook rejected submission")
            }
            SubmissionResult::NetworkError(message) => {
                tracing::warn!(error = %message, "Webhook unreachable")
            }
        }

        outcome
    }
}

/// Map an HTTP status to a submission outcome.
pub fn classify(status: StatusCode) -> SubmissionResult {
    if status.is_success() {
        SubmissionResult::Success
    } else {
        SubmissionResult::Rejected(status.as_u16())
    }
}

/// Error text including its causes, e.g. the refused connection under a send error.
pub(crate) fn describe_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioFile, OutputFormat};
    use bytes::Bytes;
    use mockito::Matcher;

    fn request() -> SubmissionRequest {
        SubmissionRequest {
            files: vec![AudioFile {
                file_name: "take1.wav".into(),
                content: Bytes::from_static(b"RIFFdata"),
                media_type: "audio/wav".into(),
            }],
            email: "artist@example.com".into(),
            mix_wideness: 65,
            output_formats: [OutputFormat::Binaural].into_iter().collect(),
            content_types: Default::default(),
        }
    }

    fn client(url: &str) -> WebhookClient {
        WebhookClient::new(Url::parse(url).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(StatusCode::OK), SubmissionResult::Success);
        assert_eq!(classify(StatusCode::ACCEPTED), SubmissionResult::Success);
        assert_eq!(classify(StatusCode::FOUND), SubmissionResult::Rejected(302));
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR),
            SubmissionResult::Rejected(500)
        );
    }

    #[tokio::test]
    async fn test_submit_success_posts_multipart_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="audioFiles"; filename="take1.wav""#.into()),
                Matcher::Regex(r#"name="mix_wideness"\r\n\r\n65"#.into()),
                Matcher::Regex(r#"name="output_formats"\r\n\r\nBinaural"#.into()),
            ]))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let outcome = client(&format!("{}/hook", server.url()))
            .submit(&request())
            .await;

        assert_eq!(outcome, SubmissionResult::Success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let outcome = client(&format!("{}/hook", server.url()))
            .submit(&request())
            .await;

        assert_eq!(outcome, SubmissionResult::Rejected(500));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_connection_refused() {
        // port 1 is never listening
        let outcome = client("http://127.0.0.1:1/hook").submit(&request()).await;

        match outcome {
            SubmissionResult::NetworkError(message) => {
                assert!(message.contains("error sending request"), "{message}");
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
