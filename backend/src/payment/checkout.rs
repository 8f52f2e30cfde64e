//! Hosted checkout session creation (Stripe-compatible API).
//!
//! `POST {api_base}/v1/checkout/sessions`, form-encoded, bearer secret key.
//! The returned `url` is single-use and belongs to one submission.

use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::{PaymentError, PaymentResult};
use crate::webhook::describe_error;

/// Settings for [`CheckoutSessionClient`].
#[derive(Clone)]
pub struct CheckoutSettings {
    pub api_base: Url,
    pub secret_key: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl fmt::Debug for CheckoutSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutSettings")
            .field("api_base", &self.api_base.as_str())
            .field("secret_key", &"<redacted>")
            .field("price_id", &self.price_id)
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .finish()
    }
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Client for the checkout session API.
#[derive(Debug, Clone)]
pub struct CheckoutSessionClient {
    http: reqwest::Client,
    settings: CheckoutSettings,
}

impl CheckoutSessionClient {
    pub fn new(settings: CheckoutSettings, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, settings })
    }

    /// Create a one-time checkout session, pre-filling the customer email.
    pub async fn create_session(&self, customer_email: &str) -> PaymentResult<CheckoutSession> {
        let endpoint = sessions_endpoint(&self.settings.api_base)?;

        let params = [
            ("mode", "payment"),
            ("payment_method_types[]", "card"),
            ("line_items[0][price]", self.settings.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", self.settings.success_url.as_str()),
            ("cancel_url", self.settings.cancel_url.as_str()),
            ("customer_email", customer_email),
        ];

        tracing::debug!(endpoint = %endpoint, price = %self.settings.price_id, "Creating checkout session");

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.settings.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Request(describe_error(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Request(describe_error(&e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SessionResponse =
            serde_json::from_str(&body).map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        match (parsed.id, parsed.url) {
            (Some(id), Some(url)) if !url.is_empty() => {
                tracing::info!(session = %id, "Checkout session created");
                Ok(CheckoutSession { id, url })
            }
            _ => Err(PaymentError::InvalidResponse(
                "response has no checkout url".into(),
            )),
        }
    }
}

/// `{api_base}/v1/checkout/sessions`, keeping any path prefix of the base.
fn sessions_endpoint(api_base: &Url) -> PaymentResult<Url> {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("v1/checkout/sessions")
        .map_err(|e| PaymentError::Request(e.to_string()))
}
