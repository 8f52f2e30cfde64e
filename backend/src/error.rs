//! Error types for the intake flow.
//!
//! One enum per concern, composed upward:
//!
//! - [`ConfigError`] - Environment configuration errors
//! - [`ValidationError`] - Form input rejected locally, no network call made
//! - [`PaymentError`] - Checkout session creation failures
//! - [`StateError`] - Illegal UI state transitions
//! - [`SubmitError`] - Top-level outcome of a submit action
//! - [`ServerError`] - HTTP server startup errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required key is not set (or blank).
    #[error("Missing {0} environment variable")]
    Missing(&'static str),

    /// Key is set but its value is unusable.
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Input rejected before anything is sent to the webhook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Audio files and/or email were not provided.
    #[error("Please fill all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Mix wideness outside 0..=100 or not a number.
    #[error("Mix wideness must be a whole number between 0 and 100, got '{0}'")]
    InvalidMixWideness(String),

    /// Selection that is not part of the fixed catalog.
    #[error("Unknown option for {field}: '{value}'")]
    UnknownOption { field: &'static str, value: String },
}

// =============================================================================
// Payment Errors
// =============================================================================

/// Errors from the payment provider while creating a checkout session.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport failure talking to the provider.
    #[error("request failed: {0}")]
    Request(String),

    /// Provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider answered 2xx but the body is not a usable session.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// State Errors
// =============================================================================

/// A UI event that is not allowed from the session's current state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    /// A submission for this session is already in flight.
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// The session already reached the payment step.
    #[error("This submission is complete, continue to payment or start over")]
    AlreadySubmitted,

    /// Event does not apply to the current state.
    #[error("Cannot apply '{event}' while {state}")]
    InvalidTransition { state: &'static str, event: &'static str },

    /// Session id is unknown or expired.
    #[error("Session not found")]
    UnknownSession,
}

// =============================================================================
// Submit Errors (top-level)
// =============================================================================

/// Everything that can end a submit attempt without reaching payment.
///
/// Display strings are shown to the user verbatim.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Input failed local validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Webhook answered with a non-2xx status.
    #[error("Webhook submission failed: {0}")]
    WebhookRejected(u16),

    /// Webhook could not be reached.
    #[error("Webhook error: {0}")]
    Network(String),

    /// Checkout session could not be created.
    #[error("Payment setup failed: {0}")]
    PaymentSetup(#[from] PaymentError),

    /// Submit is not allowed in the current state.
    #[error("{0}")]
    State(#[from] StateError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Outbound HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Socket bind or serve failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for input validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for payment operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

/// Result type for submit actions.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ValidationError -> SubmitError keeps the user-facing text
        let err: SubmitError = ValidationError::MissingFields(vec!["audio files", "email"]).into();
        assert_eq!(
            err.to_string(),
            "Please fill all required fields: audio files, email"
        );

        // PaymentError -> SubmitError
        let err: SubmitError = PaymentError::Api {
            status: 402,
            message: "No such price".into(),
        }
        .into();
        assert!(err.to_string().starts_with("Payment setup failed"));
        assert!(err.to_string().contains("No such price"));
    }

    #[test]
    fn test_webhook_error_format() {
        assert_eq!(
            SubmitError::WebhookRejected(500).to_string(),
            "Webhook submission failed: 500"
        );
        assert_eq!(
            SubmitError::Network("connection refused".into()).to_string(),
            "Webhook error: connection refused"
        );
    }

    #[test]
    fn test_state_error_format() {
        let err = StateError::InvalidTransition {
            state: "collecting",
            event: "payment_ready",
        };
        let msg = err.to_string();
        assert!(msg.contains("collecting"));
        assert!(msg.contains("payment_ready"));
    }
}
