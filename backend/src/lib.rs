//! # Atmos - audio intake for Dolby Atmos conversion
//!
//! Collects audio files and conversion preferences from a web form, forwards
//! them to a conversion webhook, and sends the user on to a hosted checkout.
//! No audio or payment processing happens here.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  HTML form  │────▶│ Validation  │────▶│  Webhook    │────▶│  Payment    │
//! │ (multipart) │     │ + builder   │     │  (1 POST)   │     │  redirect   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                 UI state per session: Collecting → Submitting → AwaitingPayment | Failed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use atmos::{Config, server::start_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     start_server(config, None).await.unwrap();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment configuration
//! - [`models`] - Domain models (SubmissionRequest, UiState, PaymentTarget)
//! - [`validation`] - Form input validation
//! - [`submission`] - Multipart wire encoding for the webhook
//! - [`webhook`] - Webhook client
//! - [`payment`] - Static link or checkout session
//! - [`controller`] - UI state machine and session store
//! - [`api`] - HTTP server and pages

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Input
pub mod validation;

// Outbound
pub mod payment;
pub mod submission;
pub mod webhook;

// State
pub mod controller;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors and configuration
// =============================================================================

pub use config::{Config, PaymentConfig};
pub use error::{
    ConfigError, PaymentError, ServerError, StateError, SubmitError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AudioFile, CatalogOption, ContentType, FormDraft, FormInput, OutputFormat, PaymentTarget,
    SubmissionRequest, SubmissionResult, UiState,
};

// =============================================================================
// Re-exports - Submission pipeline
// =============================================================================

pub use controller::{SessionStore, SessionView, SubmissionController, UiEvent};
pub use payment::{CheckoutSessionClient, PaymentRedirector};
pub use submission::{build_form, decode_selection, encode_selection, load_audio_file};
pub use validation::validate_input;
pub use webhook::WebhookClient;

// Server
pub mod server {
    pub use crate::api::server::{create_router, start_server, AppState};
}
