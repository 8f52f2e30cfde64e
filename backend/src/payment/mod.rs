//! Payment hand-off after a successful submission.
//!
//! A deployment uses exactly one strategy:
//!
//! - [`PaymentRedirector::StaticLink`] - fixed hosted checkout page
//! - [`PaymentRedirector::CheckoutSession`] - one-time session per submission
//!
//! Either way the result is a [`PaymentTarget`] stored in the session.

pub mod checkout;

use reqwest::Url;
use std::time::Duration;

use crate::config::PaymentConfig;
use crate::error::PaymentResult;
use crate::models::{PaymentTarget, SubmissionRequest};

pub use checkout::{CheckoutSession, CheckoutSessionClient, CheckoutSettings};

/// Produces the payment target for an accepted submission.
#[derive(Debug, Clone)]
pub enum PaymentRedirector {
    StaticLink(Url),
    CheckoutSession(CheckoutSessionClient),
}

impl PaymentRedirector {
    pub fn from_config(config: &PaymentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(match config {
            PaymentConfig::StaticLink { url } => Self::StaticLink(url.clone()),
            PaymentConfig::CheckoutSession(settings) => {
                Self::CheckoutSession(CheckoutSessionClient::new(settings.clone(), timeout)?)
            }
        })
    }

    /// Resolve where this submission pays. Called once per accepted submission.
    pub async fn prepare(&self, request: &SubmissionRequest) -> PaymentResult<PaymentTarget> {
        match self {
            Self::StaticLink(url) => Ok(PaymentTarget::StaticLink {
                url: url.to_string(),
            }),
            Self::CheckoutSession(client) => {
                let session = client.create_session(&request.email).await?;
                Ok(PaymentTarget::CheckoutSession {
                    id: session.id,
                    url: session.url,
                })
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::StaticLink(_) => "link",
            Self::CheckoutSession(_) => "session",
        }
    }
}
