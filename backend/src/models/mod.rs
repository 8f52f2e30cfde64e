//! Domain models for the intake flow.
//!
//! - [`AudioFile`] - One uploaded file, passed through untouched
//! - [`SubmissionRequest`] - Validated form input, ready to send
//! - [`OutputFormat`] / [`ContentType`] - Fixed selection catalogs
//! - [`SubmissionResult`] - Webhook outcome classification
//! - [`UiState`] - What the page shows for a session
//! - [`PaymentTarget`] - Where the user goes to pay

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// Catalogs
// =============================================================================

/// A fixed set of options offered by a multi-select control.
///
/// Labels are the strings shown to the user and sent over the wire.
pub trait CatalogOption: Sized + Copy + Ord + 'static {
    /// Every option, in display order.
    const ALL: &'static [Self];

    /// Human-readable name of the control, used in error messages.
    const FIELD: &'static str;

    /// Wire/display label.
    fn label(self) -> &'static str;

    /// Look up an option by its exact label.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.label() == label)
    }
}

/// Requested output format of the conversion.
///
/// Variant order is catalog order; sets of these sort the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "2.0 Stereo")]
    Stereo,
    #[serde(rename = "Binaural")]
    Binaural,
    #[serde(rename = "5.1 Surround")]
    Surround51,
    #[serde(rename = "7.1.4 Surround")]
    Surround714,
    #[serde(rename = "ADM BWF (Dolby Atmos file)")]
    AdmBwf,
}

impl CatalogOption for OutputFormat {
    const ALL: &'static [Self] = &[
        Self::Stereo,
        Self::Binaural,
        Self::Surround51,
        Self::Surround714,
        Self::AdmBwf,
    ];
    const FIELD: &'static str = "output format";

    fn label(self) -> &'static str {
        match self {
            Self::Stereo => "2.0 Stereo",
            Self::Binaural => "Binaural",
            Self::Surround51 => "5.1 Surround",
            Self::Surround714 => "7.1.4 Surround",
            Self::AdmBwf => "ADM BWF (Dolby Atmos file)",
        }
    }
}

/// Kind of material being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "Music content")]
    Music,
    #[serde(rename = "Sound design content")]
    SoundDesign,
    #[serde(rename = "Other content")]
    Other,
}

impl CatalogOption for ContentType {
    const ALL: &'static [Self] = &[Self::Music, Self::SoundDesign, Self::Other];
    const FIELD: &'static str = "content type";

    fn label(self) -> &'static str {
        match self {
            Self::Music => "Music content",
            Self::SoundDesign => "Sound design content",
            Self::Other => "Other content",
        }
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Mix wideness used when the form does not send one.
pub const DEFAULT_MIX_WIDENESS: u8 = 50;

/// Upper bound of the mix wideness control.
pub const MAX_MIX_WIDENESS: u8 = 100;

/// An uploaded audio file. Content is opaque and never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub file_name: String,
    pub content: Bytes,
    pub media_type: String,
}

/// Input that passed validation and can be sent to the webhook.
///
/// Built by [`crate::validation::validate_input`], which guarantees at least
/// one file, a non-blank email and a wideness in `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub files: Vec<AudioFile>,
    pub email: String,
    pub mix_wideness: u8,
    pub output_formats: BTreeSet<OutputFormat>,
    pub content_types: BTreeSet<ContentType>,
}

/// Raw values as they arrive from the form, before validation.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub files: Vec<AudioFile>,
    pub email: String,
    pub mix_wideness: Option<String>,
    pub output_formats: Vec<String>,
    pub content_types: Vec<String>,
}

/// Non-file values kept per session to pre-fill the form after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    pub email: String,
    pub mix_wideness: u8,
    pub output_formats: Vec<String>,
    pub content_types: Vec<String>,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            email: String::new(),
            mix_wideness: DEFAULT_MIX_WIDENESS,
            output_formats: Vec::new(),
            content_types: Vec::new(),
        }
    }
}

impl From<&FormInput> for FormDraft {
    fn from(input: &FormInput) -> Self {
        let mix_wideness = input
            .mix_wideness
            .as_deref()
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|v| *v <= MAX_MIX_WIDENESS)
            .unwrap_or(DEFAULT_MIX_WIDENESS);

        Self {
            email: input.email.trim().to_string(),
            mix_wideness,
            output_formats: input.output_formats.clone(),
            content_types: input.content_types.clone(),
        }
    }
}

// =============================================================================
// Outcomes and UI state
// =============================================================================

/// Classification of a single webhook POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// Webhook answered 2xx.
    Success,
    /// Webhook answered with this non-2xx status.
    Rejected(u16),
    /// Request never got a response.
    NetworkError(String),
}

/// Where the user is sent to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentTarget {
    /// Fixed hosted checkout page.
    StaticLink { url: String },
    /// One-time checkout session created for this submission.
    CheckoutSession { id: String, url: String },
}

impl PaymentTarget {
    pub fn url(&self) -> &str {
        match self {
            PaymentTarget::StaticLink { url } => url,
            PaymentTarget::CheckoutSession { url, .. } => url,
        }
    }
}

/// What the page shows for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UiState {
    /// Form is shown and accepts a submission.
    #[default]
    Collecting,
    /// Webhook (and payment setup) call in flight.
    Submitting,
    /// Submission accepted; only the payment step remains.
    AwaitingPayment { target: PaymentTarget },
    /// Last attempt failed; form is shown again with the message.
    Failed { message: String },
}

impl UiState {
    /// Short machine name, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            UiState::Collecting => "collecting",
            UiState::Submitting => "submitting",
            UiState::AwaitingPayment { .. } => "awaiting_payment",
            UiState::Failed { .. } => "failed",
        }
    }

    /// Whether the input collector is shown and a submit may start.
    pub fn accepts_input(&self) -> bool {
        matches!(self, UiState::Collecting | UiState::Failed { .. })
    }
}
